use serde::Serialize;
use thiserror::Error;

/// JSON-RPC error codes used on the protocol channel. Tool failures never
/// surface here; they travel inside the tool result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Serialize, Error)]
#[error("{message}")]
pub struct McpError {
    pub code: ErrorCode,
    pub message: String,
}

impl McpError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, "Parse error")
    }

    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest, "Invalid request")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// Unknown tool name, with close matches appended when there are any.
    pub fn unknown_tool(name: &str, suggestions: &[String]) -> Self {
        let message = if suggestions.is_empty() {
            format!("Unknown tool: {}", name)
        } else {
            format!("Unknown tool: {}. Did you mean: {}", name, suggestions.join(", "))
        };
        Self::invalid_params(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_lists_suggestions_only_when_present() {
        assert_eq!(
            McpError::unknown_tool("get_histroy", &[]).message,
            "Unknown tool: get_histroy"
        );
        let err = McpError::unknown_tool("get_histroy", &["get_history".to_string()]);
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert_eq!(err.to_string(), "Unknown tool: get_histroy. Did you mean: get_history");
    }

    #[test]
    fn method_not_found_names_the_method() {
        let err = McpError::method_not_found("resources/list");
        assert_eq!(err.code.as_i32(), -32601);
        assert_eq!(err.message, "Method not found: resources/list");
    }
}
