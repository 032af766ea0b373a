//! Chat backend access
//!
//! `HttpChatApi` talks to the backend; `LoggingChatApi` wraps any
//! [`ChatApi`] with per-call logging.

mod client;
mod error;
mod types;

pub use client::HttpChatApi;
pub use error::ApiError;
#[allow(unused_imports)] // Wire contracts re-exported for API completeness
pub use types::*;

use crate::runtime::ChatApi;
use crate::session::Credential;
use crate::state_machine::{EditedMessage, Exchange, MessageId};
use async_trait::async_trait;
use std::time::Instant;

/// Logging wrapper for chat backends
pub struct LoggingChatApi<A> {
    inner: A,
}

impl<A: ChatApi> LoggingChatApi<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(operation: &str, started: Instant, result: &Result<T, ApiError>) {
    let duration = started.elapsed();
    match result {
        Ok(_) => {
            tracing::info!(
                operation,
                duration_ms = %duration.as_millis(),
                "Chat request completed"
            );
        }
        Err(e) => {
            tracing::error!(
                operation,
                duration_ms = %duration.as_millis(),
                kind = e.kind(),
                error = %e,
                "Chat request failed"
            );
        }
    }
}

#[async_trait]
impl<A: ChatApi> ChatApi for LoggingChatApi<A> {
    async fn send_message(
        &self,
        text: &str,
        credential: &Credential,
    ) -> Result<Exchange, ApiError> {
        let started = Instant::now();
        let result = self.inner.send_message(text, credential).await;
        log_outcome("send", started, &result);
        result
    }

    async fn edit_message(
        &self,
        id: MessageId,
        text: &str,
        credential: &Credential,
    ) -> Result<EditedMessage, ApiError> {
        let started = Instant::now();
        let result = self.inner.edit_message(id, text, credential).await;
        log_outcome("edit", started, &result);
        result
    }

    async fn delete_message(&self, id: MessageId, credential: &Credential) -> Result<(), ApiError> {
        let started = Instant::now();
        let result = self.inner.delete_message(id, credential).await;
        log_outcome("delete", started, &result);
        result
    }
}
