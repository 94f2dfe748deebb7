//! Tool implementations, grouped by the upstream resource they manage.
//!
//! Each manager owns a closed set of tools (an enum) and answers every call
//! with an envelope. [`BoundTool`] pairs a manager with one of its tools so it
//! can sit in the executor's name-keyed handler map.

pub mod experiences;
pub mod history;
pub mod jobs;
pub mod profile;
pub mod tech_skill;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ToolError, ToolErrorKind};
use crate::mcp::envelope::{error_response, ToolResponse};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;

#[async_trait]
pub trait ToolSet: Send + Sync + 'static {
    type Tool: Copy + Send + Sync + 'static;

    fn tools() -> &'static [Self::Tool];

    fn tool_name(tool: Self::Tool) -> &'static str;

    async fn call(&self, tool: Self::Tool, args: Value) -> ToolResponse;
}

pub struct BoundTool<M: ToolSet> {
    manager: Arc<M>,
    tool: M::Tool,
}

#[async_trait]
impl<M: ToolSet> ToolHandler for BoundTool<M> {
    async fn handle(&self, args: Value) -> ToolResponse {
        self.manager.call(self.tool, args).await
    }
}

/// Registers every tool of `manager` under its public name.
pub fn register<M: ToolSet>(handlers: &mut HashMap<String, Arc<dyn ToolHandler>>, manager: Arc<M>) {
    for &tool in M::tools() {
        handlers.insert(
            M::tool_name(tool).to_string(),
            Arc::new(BoundTool {
                manager: manager.clone(),
                tool,
            }),
        );
    }
}

pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::invalid_params(err.to_string()))
}

/// Folds a fallible tool body into its envelope, logging the failure.
pub(crate) fn respond(
    logger: &Logger,
    tool: &str,
    failure: &str,
    result: Result<ToolResponse, ToolError>,
) -> ToolResponse {
    match result {
        Ok(response) => response,
        Err(err) => {
            let mut meta = err.log_meta();
            if let Value::Object(map) = &mut meta {
                map.insert("tool".to_string(), Value::String(tool.to_string()));
            }
            match err.kind() {
                ToolErrorKind::Internal => logger.error(failure, Some(&meta)),
                _ => logger.warn(failure, Some(&meta)),
            }
            error_response(&err, failure)
        }
    }
}
