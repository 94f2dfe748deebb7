use crate::constants::{api, env};
use crate::services::api_key::CredentialSource;
use crate::services::logger::LogLevel;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unsupported base url scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("invalid log level {0:?}, expected one of off, error, warn, info, debug")]
    InvalidLogLevel(String),
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub log_level: LogLevel,
    pub credentials: CredentialSource,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(ConfigOverrides::default())
    }

    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let raw_base = overrides
            .base_url
            .or_else(|| non_blank_env(env::BASE_URL))
            .unwrap_or_else(|| api::DEFAULT_BASE_URL.to_string());
        let log_level = match overrides.log_level.or_else(|| non_blank_env(env::LOG_LEVEL)) {
            Some(raw) => LogLevel::parse(&raw).ok_or(ConfigError::InvalidLogLevel(raw))?,
            None => LogLevel::Info,
        };
        Ok(Self {
            base_url: parse_base_url(&raw_base)?,
            log_level,
            credentials: CredentialSource::Environment(env::API_KEY.to_string()),
        })
    }

    /// Configuration pointing at `base_url` with a fixed credential. Used by
    /// tests and by hosts that manage the key themselves.
    pub fn with_fixed_key(base_url: &str, api_key: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            log_level: LogLevel::Off,
            credentials: CredentialSource::Fixed(api_key.map(|key| key.to_string())),
        })
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses the API base and guarantees a trailing slash so that relative
/// resource paths join under it instead of replacing its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash).map_err(|err| ConfigError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
