//! Client configuration from the environment

use crate::session::Credential;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_VIEWPORT_ROWS: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PARLEY_SESSION_TOKEN is not set; sign in with the identity provider first")]
    MissingToken,
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Configuration for the chat client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL
    pub api_url: String,
    pub credential: Credential,
    /// `None` means calls may hang indefinitely
    pub request_timeout: Option<Duration>,
    /// Number of messages the console shows at once
    pub viewport_rows: usize,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("PARLEY_SESSION_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let request_timeout = parse_positive(&lookup, "PARLEY_REQUEST_TIMEOUT_SECS")?
            .map(|secs| Duration::from_secs(secs as u64));

        Ok(Self {
            api_url: lookup("PARLEY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            credential: Credential::new(token),
            request_timeout,
            viewport_rows: parse_positive(&lookup, "PARLEY_VIEWPORT_ROWS")?
                .unwrap_or(DEFAULT_VIEWPORT_ROWS),
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<usize>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
