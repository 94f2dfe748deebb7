//! Test doubles for exercising tools without a network.
//!
//! [`StubTransport`] replays queued responses in FIFO order and records every
//! request it receives, so tests can assert on both the outcome of a tool and
//! the exact HTTP traffic it produced.
//!
//! ```rust,no_run
//! use lapras_mcp::testing::StubTransport;
//!
//! let transport = StubTransport::new();
//! transport.push_json(200, serde_json::json!({"experience_list": []}));
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::errors::ToolError;
use crate::services::api_client::{ApiRequest, ApiResponse, HttpTransport};

enum Scripted {
    Respond(ApiResponse),
    Fail(String),
}

/// An [`HttpTransport`] that answers from a script.
///
/// Running out of scripted responses is reported as a transport failure
/// rather than a panic so that a tool issuing an unexpected request still
/// produces an error envelope the test can inspect.
#[derive(Default)]
pub struct StubTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Scripted::Respond(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn push_text(&self, status: u16, body: &str) {
        self.push(Scripted::Respond(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Queue a connection-level failure.
    pub fn push_failure(&self, message: &str) {
        self.push(Scripted::Fail(message.to_string()));
    }

    fn push(&self, entry: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Requests with the given method, in the order they were sent.
    pub fn requests_with(&self, method: Method) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method)
            .collect()
    }

    /// The single request that was sent. Panics when there were zero or several.
    pub fn only_request(&self) -> ApiRequest {
        let mut requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.remove(0)
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ToolError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ToolError::Transport(message)),
            None => Err(ToolError::Transport(format!(
                "no scripted response for {} {}",
                request.method,
                request.url.path()
            ))),
        }
    }
}
