#![allow(dead_code)]

use lapras_mcp::app::App;
use lapras_mcp::mcp::envelope::ToolResponse;
use lapras_mcp::services::config::Config;
use lapras_mcp::testing::StubTransport;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub const BASE_URL: &str = "https://lapras.com/api/mcp";

pub fn restore_env(key: &str, previous: Option<String>) {
    match previous {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}

/// App wired to a fresh stub transport, with a fixed API key (or none).
pub fn app_with_key(key: Option<&str>) -> (App, Arc<StubTransport>) {
    let transport = Arc::new(StubTransport::new());
    let config = Config::with_fixed_key(BASE_URL, key).expect("valid config");
    let app = App::with_transport(config, transport.clone()).expect("app wiring");
    (app, transport)
}

pub fn app() -> (App, Arc<StubTransport>) {
    app_with_key(Some("test-key"))
}

pub async fn call(app: &App, tool: &str, args: Value) -> ToolResponse {
    app.tool_executor
        .execute(tool, args)
        .await
        .expect("tool is registered")
}

/// Parsed JSON payload of the first content item.
pub fn payload(response: &ToolResponse) -> Value {
    serde_json::from_str(response.first_text()).expect("payload is JSON")
}

pub fn experience(organization: &str) -> Value {
    json!({
        "organization_name": organization,
        "positions": [{"id": 2}],
        "position_name": "Engineer",
        "is_client_work": false,
        "start_year": 2020,
        "start_month": 4,
        "end_year": 0,
        "end_month": 0,
        "description": "Built things"
    })
}

pub fn experience_list(organizations: &[&str]) -> Value {
    json!({
        "experience_list": organizations
            .iter()
            .enumerate()
            .map(|(i, org)| {
                let mut exp = experience(org);
                exp["id"] = json!(i as i64 + 1);
                exp
            })
            .collect::<Vec<_>>()
    })
}
