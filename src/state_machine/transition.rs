//! Pure state transition function
//!
//! Given the same state and event this always produces the same next state
//! and effects. Remote calls are described by [`Effect`]s and executed by the
//! runtime; their outcomes come back in as events.

use super::state::{ChatState, Message, MessageId, GENERIC_FAILURE};
use super::{Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Intents the store refuses; none of them change state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A message is already being sent")]
    SendInFlight,
    #[error("No message with id {0}")]
    UnknownMessage(MessageId),
    #[error("Message {0} cannot be edited or deleted")]
    NotMutable(MessageId),
}

/// Pure transition function
pub fn transition(state: &ChatState, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Send
        // ============================================================
        Event::SendRequested { text } => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            if state.pending || state.has_placeholder() {
                return Err(TransitionError::SendInFlight);
            }

            let mut next = state.clone();
            next.last_error = None;
            next.pending = true;
            next.log.push(Message::placeholder(text.clone()));
            Ok(TransitionResult::new(next).with_effect(Effect::send(text)))
        }

        Event::SendSucceeded { exchange } => {
            let mut next = state.clone();
            next.log.retain(|m| !m.is_placeholder());
            next.log.extend(exchange.messages);
            next.pending = false;
            Ok(TransitionResult::new(next))
        }

        Event::SendFailed => {
            let mut next = state.clone();
            next.log.retain(|m| !m.is_placeholder());
            next.last_error = Some(GENERIC_FAILURE.to_string());
            next.pending = false;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Edit (optimistic)
        // ============================================================
        Event::EditRequested { id, text } => {
            let index = mutable_position(state, id)?;

            let mut next = state.clone();
            next.last_error = None;
            let previous = next.log[index].clone();
            next.log[index].text.clone_from(&text);
            Ok(TransitionResult::new(next).with_effect(Effect::edit(previous, text)))
        }

        Event::EditSucceeded { message } => {
            let mut next = state.clone();
            // Server text wins, even if it differs from what we sent
            if let Some(index) = next.position(message.id) {
                next.log[index].text = message.text;
            }
            Ok(TransitionResult::new(next))
        }

        Event::EditFailed { previous } => {
            let mut next = state.clone();
            if let Some(index) = next.position(previous.id) {
                next.log[index] = previous;
            }
            next.last_error = Some(GENERIC_FAILURE.to_string());
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Delete (not optimistic)
        // ============================================================
        Event::DeleteRequested { id } => {
            mutable_position(state, id)?;

            let mut next = state.clone();
            next.last_error = None;
            Ok(TransitionResult::new(next).with_effect(Effect::delete(id)))
        }

        Event::DeleteSucceeded { id } => {
            let mut next = state.clone();
            next.log.retain(|m| m.id != id);
            Ok(TransitionResult::new(next))
        }

        Event::DeleteFailed { .. } => {
            let mut next = state.clone();
            next.last_error = Some(GENERIC_FAILURE.to_string());
            Ok(TransitionResult::new(next))
        }
    }
}

/// Index of the message targeted by an edit or delete, if it may be mutated
fn mutable_position(state: &ChatState, id: MessageId) -> Result<usize, TransitionError> {
    if id.is_sentinel() {
        return Err(TransitionError::NotMutable(id));
    }
    let index = state
        .position(id)
        .ok_or(TransitionError::UnknownMessage(id))?;
    if state.log[index].is_mutable() {
        Ok(index)
    } else {
        Err(TransitionError::NotMutable(id))
    }
}
