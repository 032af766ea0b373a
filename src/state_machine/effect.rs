//! Effects produced by state transitions

use super::state::{Message, MessageId};

/// Remote calls to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Post a new message; resolves to `SendSucceeded` or `SendFailed`
    SendMessage { text: String },

    /// Push an edit; resolves to `EditSucceeded` or `EditFailed`
    EditMessage {
        id: MessageId,
        text: String,
        /// Pre-edit snapshot handed back on failure so the edit can be undone
        previous: Message,
    },

    /// Delete a message; resolves to `DeleteSucceeded` or `DeleteFailed`
    DeleteMessage { id: MessageId },
}

impl Effect {
    pub fn send(text: impl Into<String>) -> Self {
        Effect::SendMessage { text: text.into() }
    }

    pub fn edit(previous: Message, text: impl Into<String>) -> Self {
        Effect::EditMessage {
            id: previous.id,
            text: text.into(),
            previous,
        }
    }

    pub fn delete(id: MessageId) -> Self {
        Effect::DeleteMessage { id }
    }
}
