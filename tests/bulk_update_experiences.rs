mod common;
use common::{app, call, experience, experience_list, payload};

use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn shrinking_list_is_rejected_without_mutation() {
    let (app, transport) = app();
    transport.push_json(200, experience_list(&["A", "B"]));

    let response = call(
        &app,
        "bulk_update_experiences",
        json!({"experience_list": [experience("A")], "force": false}),
    )
    .await;

    assert!(response.is_error());
    let body = payload(&response);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("force=true"));
    let details = body["details"].as_str().unwrap_or_default();
    assert!(details.contains("from 2 to 1"), "{}", details);
    assert!(details.contains("B"), "{}", details);

    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.requests()[0].method, Method::GET);
}

#[tokio::test]
async fn force_replaces_with_null_ids() {
    let (app, transport) = app();
    transport.push_json(200, experience_list(&["A", "B"]));
    transport.push_json(200, json!({"error": false}));

    let mut only_a = experience("A");
    only_a["id"] = json!(1);
    let response = call(
        &app,
        "bulk_update_experiences",
        json!({"experience_list": [only_a], "force": true}),
    )
    .await;

    assert!(!response.is_error(), "{}", response.first_text());
    let posts = transport.requests_with(Method::POST);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].url.path(), "/api/mcp/experiences");
    let submitted = posts[0].body.clone().expect("POST has a body");
    let list = submitted["experience_list"].as_array().expect("list");
    assert_eq!(list.len(), 1);
    assert!(list[0]["id"].is_null());
    assert_eq!(list[0]["organization_name"], "A");
}

#[tokio::test]
async fn reordered_superset_goes_through_without_force() {
    let (app, transport) = app();
    transport.push_json(200, experience_list(&["A", "B"]));
    transport.push_json(200, json!({"error": false}));

    let response = call(
        &app,
        "bulk_update_experiences",
        json!({"experience_list": [experience("B"), experience("A"), experience("C")]}),
    )
    .await;

    assert!(!response.is_error(), "{}", response.first_text());
    let posts = transport.requests_with(Method::POST);
    assert_eq!(posts.len(), 1);
    let list = posts[0].body.as_ref().expect("body")["experience_list"]
        .as_array()
        .cloned()
        .expect("list");
    assert!(list.iter().all(|exp| exp["id"].is_null()));
}

#[tokio::test]
async fn renamed_organization_is_rejected_at_equal_length() {
    let (app, transport) = app();
    transport.push_json(200, experience_list(&["A", "B"]));

    let response = call(
        &app,
        "bulk_update_experiences",
        json!({"experience_list": [experience("A"), experience("B2")]}),
    )
    .await;

    assert!(response.is_error());
    assert!(transport.requests_with(Method::POST).is_empty());
}

#[tokio::test]
async fn empty_list_is_rejected_before_any_request() {
    for force in [false, true] {
        let (app, transport) = app();
        let response = call(
            &app,
            "bulk_update_experiences",
            json!({"experience_list": [], "force": force}),
        )
        .await;
        assert!(response.is_error());
        assert_eq!(payload(&response)["details"], "experience_list is required");
        assert_eq!(transport.request_count(), 0);
    }
}

#[tokio::test]
async fn escaped_descriptions_are_repaired_before_submission() {
    let (app, transport) = app();
    transport.push_json(200, json!({"experience_list": []}));
    transport.push_json(200, json!({"error": false}));

    let mut exp = experience("A");
    exp["description"] = json!("line one\\nline two");
    let response = call(&app, "bulk_update_experiences", json!({"experience_list": [exp]})).await;

    assert!(!response.is_error(), "{}", response.first_text());
    let post = transport.requests_with(Method::POST).remove(0);
    assert_eq!(
        post.body.expect("body")["experience_list"][0]["description"],
        "line one\nline two"
    );
}

#[tokio::test]
async fn upstream_failure_on_fetch_is_reported() {
    let (app, transport) = app();
    transport.push_text(500, "boom");

    let response = call(
        &app,
        "bulk_update_experiences",
        json!({"experience_list": [experience("A")]}),
    )
    .await;

    assert!(response.is_error());
    let body = payload(&response);
    assert_eq!(body["error"], "Failed to update experiences");
    assert_eq!(body["details"], "API request failed with status: 500");
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn transport_failure_on_replace_is_reported() {
    let (app, transport) = app();
    transport.push_json(200, experience_list(&["A"]));
    transport.push_failure("connection refused");

    let response = call(
        &app,
        "bulk_update_experiences",
        json!({"experience_list": [experience("A")]}),
    )
    .await;

    assert!(response.is_error());
    assert_eq!(payload(&response)["details"], "connection refused");
}
