//! Events that can occur in a conversation

use super::state::{EditedMessage, Exchange, Message, MessageId};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User intents
    SendRequested {
        text: String,
    },
    EditRequested {
        id: MessageId,
        text: String,
    },
    DeleteRequested {
        id: MessageId,
    },

    // Remote results
    SendSucceeded {
        exchange: Exchange,
    },
    /// Failure details are logged where the call ran; the view only ever
    /// shows the generic failure text
    SendFailed,
    EditSucceeded {
        message: EditedMessage,
    },
    EditFailed {
        /// The message as it was before the optimistic edit
        previous: Message,
    },
    DeleteSucceeded {
        id: MessageId,
    },
    DeleteFailed {
        id: MessageId,
    },
}

impl Event {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SendRequested { .. } => "send_requested",
            Event::EditRequested { .. } => "edit_requested",
            Event::DeleteRequested { .. } => "delete_requested",
            Event::SendSucceeded { .. } => "send_succeeded",
            Event::SendFailed => "send_failed",
            Event::EditSucceeded { .. } => "edit_succeeded",
            Event::EditFailed { .. } => "edit_failed",
            Event::DeleteSucceeded { .. } => "delete_succeeded",
            Event::DeleteFailed { .. } => "delete_failed",
        }
    }

    /// Message an event targets, for log fields
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Event::EditRequested { id, .. }
            | Event::DeleteRequested { id }
            | Event::DeleteSucceeded { id }
            | Event::DeleteFailed { id } => Some(*id),
            Event::EditSucceeded { message } => Some(message.id),
            Event::EditFailed { previous } => Some(previous.id),
            Event::SendRequested { .. } | Event::SendSucceeded { .. } | Event::SendFailed => None,
        }
    }
}
