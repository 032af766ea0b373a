//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the store with mock implementations.

use crate::api::ApiError;
use crate::session::Credential;
use crate::state_machine::{EditedMessage, Exchange, MessageId};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote conversation backend
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Post a user message; the backend answers with the stored message and the bot reply
    async fn send_message(&self, text: &str, credential: &Credential)
        -> Result<Exchange, ApiError>;

    /// Replace the text of a stored message
    async fn edit_message(
        &self,
        id: MessageId,
        text: &str,
        credential: &Credential,
    ) -> Result<EditedMessage, ApiError>;

    /// Delete a stored message
    async fn delete_message(&self, id: MessageId, credential: &Credential) -> Result<(), ApiError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ChatApi + ?Sized> ChatApi for Arc<T> {
    async fn send_message(
        &self,
        text: &str,
        credential: &Credential,
    ) -> Result<Exchange, ApiError> {
        (**self).send_message(text, credential).await
    }

    async fn edit_message(
        &self,
        id: MessageId,
        text: &str,
        credential: &Credential,
    ) -> Result<EditedMessage, ApiError> {
        (**self).edit_message(id, text, credential).await
    }

    async fn delete_message(&self, id: MessageId, credential: &Credential) -> Result<(), ApiError> {
        (**self).delete_message(id, credential).await
    }
}
