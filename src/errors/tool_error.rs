use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    Upstream,
    Transport,
    Decode,
    Internal,
}

/// Failure of a single fallible step inside a tool. The Display text is what
/// ends up in the `details` field of the error envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),

    #[error("API request failed with status: {status}")]
    Upstream { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ToolErrorKind {
        match self {
            Self::InvalidParams(_) => ToolErrorKind::InvalidParams,
            Self::Upstream { .. } => ToolErrorKind::Upstream,
            Self::Transport(_) => ToolErrorKind::Transport,
            Self::Decode(_) => ToolErrorKind::Decode,
            Self::Internal(_) => ToolErrorKind::Internal,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured form for log lines. The upstream body is cut short so a
    /// large HTML error page does not flood stderr.
    pub fn log_meta(&self) -> serde_json::Value {
        let mut meta = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Upstream { status, body } = self {
            meta["status"] = serde_json::json!(status);
            meta["body"] = serde_json::json!(body.chars().take(200).collect::<String>());
        }
        meta
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::Internal(format!("stdio failure: {}", err))
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::Transport(err.to_string())
    }
}
