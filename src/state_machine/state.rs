//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error text shown to the user for any failed remote operation
pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again later.";

// ============================================================================
// Messages
// ============================================================================

/// Backend-assigned message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Placeholder id carried by a message whose send has not been acknowledged
    pub const SENTINEL: MessageId = MessageId(-1);

    pub fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Bot,
}

/// A single entry of the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub text: String,
}

impl Message {
    pub fn new(id: MessageId, author: Author, text: impl Into<String>) -> Self {
        Self {
            id,
            author,
            text: text.into(),
        }
    }

    #[cfg(test)]
    pub fn user(id: i64, text: impl Into<String>) -> Self {
        Self::new(MessageId(id), Author::User, text)
    }

    #[cfg(test)]
    pub fn bot(id: i64, text: impl Into<String>) -> Self {
        Self::new(MessageId(id), Author::Bot, text)
    }

    /// Optimistic stand-in for a message that is still being sent
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::new(MessageId::SENTINEL, Author::User, text)
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_sentinel()
    }

    /// Only acknowledged user messages may be edited or deleted
    pub fn is_mutable(&self) -> bool {
        self.author == Author::User && !self.id.is_sentinel()
    }
}

/// The (user message, bot reply) pair returned by a successful send,
/// kept in the order the backend returned it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub messages: [Message; 2],
}

impl Exchange {
    pub fn new(first: Message, second: Message) -> Self {
        Self {
            messages: [first, second],
        }
    }
}

/// Canonical message returned by a successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedMessage {
    pub id: MessageId,
    pub text: String,
}

// ============================================================================
// Conversation State
// ============================================================================

/// Everything the render surface needs to draw the conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatState {
    /// Ordered conversation log (display order == chronological order)
    pub log: Vec<Message>,
    /// A send is in flight; input should be disabled
    pub pending: bool,
    pub last_error: Option<String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_log(log: Vec<Message>) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn find(&self, id: MessageId) -> Option<&Message> {
        self.log.iter().find(|m| m.id == id)
    }

    pub fn position(&self, id: MessageId) -> Option<usize> {
        self.log.iter().position(|m| m.id == id)
    }

    pub fn has_placeholder(&self) -> bool {
        self.log.iter().any(Message::is_placeholder)
    }
}
