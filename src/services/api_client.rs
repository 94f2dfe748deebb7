use crate::constants::api;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Query pairs in the order they appear on the URL, percent-decoded.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ToolError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(concat!("lapras-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ToolError> {
        let mut req = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            req = req.header(*name, value);
        }
        if let Some(body) = &request.body {
            req = req.body(body.to_string());
        }
        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

enum Auth<'a> {
    Public,
    Bearer(&'a str),
}

/// Client for the LAPRAS profile API. Every call is a single request: no
/// retries, no caching.
#[derive(Clone)]
pub struct ProfileApi {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
    logger: Logger,
}

impl ProfileApi {
    pub fn new(base_url: Url, transport: Arc<dyn HttpTransport>, logger: Logger) -> Self {
        Self {
            base_url,
            transport,
            logger: logger.child("api"),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resource URL for a slash-separated path below the base.
    pub fn endpoint(&self, path: &str) -> Result<Url, ToolError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.build_url(&segments, None)
    }

    /// Resource URL for `path/{id}`; the id is encoded as one path segment.
    pub fn endpoint_with_id(&self, path: &str, id: &str) -> Result<Url, ToolError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.build_url(&segments, Some(id))
    }

    fn build_url(&self, segments: &[&str], id: Option<&str>) -> Result<Url, ToolError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ToolError::internal("API base URL cannot carry a path"))?;
            path.pop_if_empty();
            path.extend(segments);
            if let Some(id) = id {
                path.push(id);
            }
        }
        Ok(url)
    }

    pub async fn get_public(&self, mut url: Url, query: &[(String, String)]) -> Result<Value, ToolError> {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        self.execute(Method::GET, url, Auth::Public, None).await
    }

    pub async fn get(&self, url: Url, api_key: &str) -> Result<Value, ToolError> {
        self.execute(Method::GET, url, Auth::Bearer(api_key), None).await
    }

    pub async fn post(&self, url: Url, api_key: &str, body: Value) -> Result<Value, ToolError> {
        self.execute(Method::POST, url, Auth::Bearer(api_key), Some(body))
            .await
    }

    pub async fn put(&self, url: Url, api_key: &str, body: Value) -> Result<Value, ToolError> {
        self.execute(Method::PUT, url, Auth::Bearer(api_key), Some(body))
            .await
    }

    /// Deletes a resource. Only the status matters; whatever body comes back
    /// is ignored, since the deletion has already happened upstream.
    pub async fn delete(&self, url: Url, api_key: &str) -> Result<(), ToolError> {
        self.send(Method::DELETE, url, Auth::Bearer(api_key), None)
            .await
            .map(|_| ())
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        auth: Auth<'_>,
        body: Option<Value>,
    ) -> Result<Value, ToolError> {
        let response = self.send(method, url, auth, body).await?;
        decode_body(&response.body)
    }

    /// Sends one request and maps a non-2xx status to `Upstream`.
    async fn send(
        &self,
        method: Method,
        url: Url,
        auth: Auth<'_>,
        body: Option<Value>,
    ) -> Result<ApiResponse, ToolError> {
        let mut headers = Vec::new();
        if let Auth::Bearer(key) = auth {
            headers.push(("accept", api::ACCEPT.to_string()));
            if body.is_some() {
                headers.push(("Content-Type", api::CONTENT_TYPE_JSON.to_string()));
            }
            headers.push(("Authorization", format!("Bearer {}", key)));
        }

        let path = url.path().to_string();
        let method_name = method.as_str().to_string();
        self.logger.debug(
            "request",
            Some(&serde_json::json!({"method": method_name, "path": path})),
        );

        let started = Instant::now();
        let response = self
            .transport
            .send(ApiRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;
        self.logger.debug(
            "response",
            Some(&serde_json::json!({
                "method": method_name,
                "path": path,
                "status": response.status,
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );

        if !response.is_success() {
            return Err(ToolError::Upstream {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}

fn decode_body(body: &str) -> Result<Value, ToolError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::config::parse_base_url;
    use crate::testing::StubTransport;

    fn client(transport: Arc<StubTransport>) -> ProfileApi {
        let base = parse_base_url("https://lapras.com/api/mcp").expect("base url");
        ProfileApi::new(base, transport, Logger::silent())
    }

    #[test]
    fn endpoints_join_below_base_path() {
        let api = client(Arc::new(StubTransport::new()));
        assert_eq!(
            api.endpoint("tech_skill/master").expect("url").as_str(),
            "https://lapras.com/api/mcp/tech_skill/master"
        );
        assert_eq!(
            api.endpoint_with_id("job_descriptions", "a/b").expect("url").as_str(),
            "https://lapras.com/api/mcp/job_descriptions/a%2Fb"
        );
    }

    #[tokio::test]
    async fn authenticated_mutation_sends_all_headers() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(200, serde_json::json!({"ok": true}));
        let api = client(transport.clone());
        let url = api.endpoint("job_summary").expect("url");
        let result = api
            .put(url, "secret", serde_json::json!({"job_summary": "x"}))
            .await
            .expect("put succeeds");
        assert_eq!(result["ok"], true);

        let request = transport.only_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.header("accept"), Some(api::ACCEPT));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("authorization"), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn public_get_sends_no_credentials() {
        let transport = Arc::new(StubTransport::new());
        transport.push_json(200, serde_json::json!({}));
        let api = client(transport.clone());
        let url = api.endpoint("job_descriptions/search").expect("url");
        api.get_public(url, &[("positions[]".to_string(), "CTO".to_string())])
            .await
            .expect("get succeeds");

        let request = transport.only_request();
        assert!(request.header("authorization").is_none());
        assert_eq!(
            request.query_pairs(),
            vec![("positions[]".to_string(), "CTO".to_string())]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let transport = Arc::new(StubTransport::new());
        transport.push_text(404, "not found");
        let api = client(transport);
        let url = api.endpoint("experiences").expect("url");
        let err = api.get(url, "secret").await.expect_err("must fail");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API request failed with status: 404");
    }

    #[tokio::test]
    async fn empty_success_body_decodes_to_null() {
        let transport = Arc::new(StubTransport::new());
        transport.push_text(204, "");
        let api = client(transport);
        let url = api.endpoint("job_summary").expect("url");
        let value = api.get(url, "secret").await.expect("get succeeds");
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn delete_ignores_a_non_json_body() {
        let transport = Arc::new(StubTransport::new());
        transport.push_text(200, "OK");
        transport.push_text(500, "OK");
        let api = client(transport.clone());

        let url = api.endpoint_with_id("experiences", "7").expect("url");
        api.delete(url.clone(), "secret").await.expect("delete succeeds");
        let err = api.delete(url, "secret").await.expect_err("status still checked");
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.request_count(), 2);
    }
}
