//! Chat backend error types

use thiserror::Error;

/// Failure of a remote chat operation.
///
/// The variants only matter for logs; the store treats all of them as the
/// same generic failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to parse response: {message} - body: {body}")]
    Decode { message: String, body: String },
}

impl ApiError {
    pub fn status(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Short classification for structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { status, .. } if status.is_client_error() => "client_error",
            Self::Status { .. } => "server_error",
            Self::Transport(e) if e.is_timeout() => "timeout",
            Self::Transport(_) => "network",
            Self::Decode { .. } => "decode",
        }
    }
}
