use crate::managers::{respond, ToolSet};
use crate::mcp::envelope::ToolResponse;
use crate::services::history::HistoryLog;
use crate::services::logger::Logger;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryTool {
    List,
}

const TOOLS: &[HistoryTool] = &[HistoryTool::List];

/// Exposes the session history log. Needs no credentials and makes no
/// upstream calls.
pub struct HistoryManager {
    logger: Logger,
    history: HistoryLog,
}

impl HistoryManager {
    pub fn new(logger: Logger, history: HistoryLog) -> Self {
        Self {
            logger: logger.child("history"),
            history,
        }
    }
}

#[async_trait]
impl ToolSet for HistoryManager {
    type Tool = HistoryTool;

    fn tools() -> &'static [HistoryTool] {
        TOOLS
    }

    fn tool_name(tool: HistoryTool) -> &'static str {
        match tool {
            HistoryTool::List => "get_history",
        }
    }

    async fn call(&self, _tool: HistoryTool, _args: Value) -> ToolResponse {
        let entries = self.history.entries().await;
        let result = serde_json::to_value(&entries)
            .map(|value| ToolResponse::json(&value))
            .map_err(Into::into);
        respond(&self.logger, "get_history", "Failed to read history", result)
    }
}
