//! Chat backend request and response types

use crate::state_machine::{Author, EditedMessage, Exchange, Message, MessageId};
use serde::{Deserialize, Serialize};

/// Body of `POST /message` and `PUT /message/{id}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// Author tag as the backend spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireAuthor {
    User,
    #[serde(alias = "bot")]
    Chatbot,
}

impl From<WireAuthor> for Author {
    fn from(author: WireAuthor) -> Self {
        match author {
            WireAuthor::User => Author::User,
            WireAuthor::Chatbot => Author::Bot,
        }
    }
}

impl From<Author> for WireAuthor {
    fn from(author: Author) -> Self {
        match author {
            Author::User => WireAuthor::User,
            Author::Bot => WireAuthor::Chatbot,
        }
    }
}

/// A stored message as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: i64,
    pub author: WireAuthor,
    pub message: String,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message::new(MessageId(wire.id), wire.author.into(), wire.message)
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.0,
            author: message.author.into(),
            message: message.text.clone(),
        }
    }
}

/// Response of `POST /message`: exactly two messages, sent then reply
#[derive(Debug, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub exchange: (WireMessage, WireMessage),
}

impl From<ExchangeResponse> for Exchange {
    fn from(response: ExchangeResponse) -> Self {
        let (first, second) = response.exchange;
        Exchange::new(first.into(), second.into())
    }
}

/// Response of `PUT /message/{id}`
#[derive(Debug, Serialize, Deserialize)]
pub struct EditResponse {
    pub id: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<WireAuthor>,
}

impl From<EditResponse> for EditedMessage {
    fn from(response: EditResponse) -> Self {
        EditedMessage {
            id: MessageId(response.id),
            text: response.message,
        }
    }
}
