use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::McpError;
use crate::mcp::catalog::validate_tool_args;
use crate::mcp::envelope::{error_response, ToolResponse};
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;

/// A single tool. Handlers never fail: every outcome, including upstream and
/// validation failures, is already folded into the returned envelope.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> ToolResponse;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<ToolResponse, McpError> {
        let Some(handler) = self.handlers.get(tool) else {
            let suggestions = suggest(tool, &self.tool_names(), 3);
            return Err(McpError::unknown_tool(tool, &suggestions));
        };

        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };

        let call_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let response = match validate_tool_args(tool, &args) {
            Ok(()) => handler.handle(args).await,
            Err(err) => {
                self.logger.warn(
                    "rejected arguments",
                    Some(&serde_json::json!({"tool": tool, "call_id": call_id, "details": err.to_string()})),
                );
                error_response(&err, &format!("Invalid arguments for {}", tool))
            }
        };

        self.logger.info(
            "tool call",
            Some(&serde_json::json!({
                "tool": tool,
                "call_id": call_id,
                "duration_ms": started.elapsed().as_millis() as u64,
                "is_error": response.is_error(),
            })),
        );
        Ok(response)
    }
}
