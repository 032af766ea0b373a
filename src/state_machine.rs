//! Conversation store state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod scroll;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use scroll::ScrollTracker;
pub use state::{Author, ChatState, EditedMessage, Exchange, Message, MessageId};
pub use transition::transition;
