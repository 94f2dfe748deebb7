use crate::constants::{env, links};
use crate::mcp::envelope::{error_response, ToolResponse};

/// Where the bearer token comes from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read from this environment variable on every check, so a key supplied
    /// after startup is picked up.
    Environment(String),
    Fixed(Option<String>),
}

#[derive(Debug)]
pub enum ApiKeyCheck {
    Valid(String),
    /// Ready-to-return envelope telling the caller how to configure the key.
    Invalid(ToolResponse),
}

#[derive(Debug, Clone)]
pub struct ApiKeyGate {
    source: CredentialSource,
}

impl ApiKeyGate {
    pub fn new(source: CredentialSource) -> Self {
        Self { source }
    }

    pub fn from_env() -> Self {
        Self::new(CredentialSource::Environment(env::API_KEY.to_string()))
    }

    pub fn fixed(key: Option<&str>) -> Self {
        Self::new(CredentialSource::Fixed(key.map(|k| k.to_string())))
    }

    fn read_raw(&self) -> Option<String> {
        match &self.source {
            CredentialSource::Environment(var) => std::env::var(var).ok(),
            CredentialSource::Fixed(value) => value.clone(),
        }
    }

    pub fn check(&self) -> ApiKeyCheck {
        let key = self
            .read_raw()
            .map(|raw| raw.trim().to_string())
            .filter(|key| !key.is_empty());
        match key {
            Some(key) => ApiKeyCheck::Valid(key),
            None => ApiKeyCheck::Invalid(missing_key_response()),
        }
    }
}

fn missing_key_response() -> ToolResponse {
    let details = format!("{} is required", env::API_KEY);
    let message = format!(
        "{} must be configured. Get an API key at {} and set it in the env section of your MCP client configuration (mcp.json).",
        env::API_KEY,
        links::API_KEY_SETTINGS
    );
    error_response(&details, &message)
}
