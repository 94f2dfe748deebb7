//! The uniform result envelope every tool call produces, success or failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

impl ToolContent {
    pub fn text(&self) -> &str {
        match self {
            ToolContent::Text { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// Pretty-printed JSON payload.
    pub fn json(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content item, empty when there is none.
    pub fn first_text(&self) -> &str {
        self.content.first().map(ToolContent::text).unwrap_or("")
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Normalizes any failure into an error envelope. The `details` field is the
/// Display rendering of `error`: the message of a structured error, or the
/// literal form of a plain value (`404` renders as `"404"`).
pub fn error_response<E: Display + ?Sized>(error: &E, message: &str) -> ToolResponse {
    let payload = serde_json::json!({
        "error": message,
        "details": error.to_string(),
    });
    ToolResponse {
        content: vec![ToolContent::Text {
            text: payload.to_string(),
        }],
        is_error: Some(true),
    }
}
