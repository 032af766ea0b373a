//! Runtime for the conversation store
//!
//! A single task owns the [`ChatState`] and applies events one at a time.
//! Remote calls run as background tasks and report back through the same
//! event channel, so intents keep flowing while calls are in flight.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationStore;
pub use traits::*;

use crate::session::Credential;
use crate::state_machine::{ChatState, Event, MessageId};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Events sent to the render surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The view state after an applied transition
    Updated(ChatState),
    /// The log grew; show the newest entry
    ScrollToBottom,
}

/// Errors returned to the render surface when relaying intents
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation store is no longer mounted")]
    Closed,
}

/// Handle the render surface uses to relay intents
#[derive(Clone)]
pub struct StoreHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<StoreEvent>,
    shutdown: CancellationToken,
}

/// A freshly mounted store
pub struct MountedStore {
    pub handle: StoreHandle,
    /// Subscribed before the store starts, so the initial view is never missed
    pub events: broadcast::Receiver<StoreEvent>,
    pub task: JoinHandle<()>,
}

impl StoreHandle {
    /// Start a store with an empty log
    pub fn mount<A: ChatApi + 'static>(api: A, credential: Credential) -> MountedStore {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, events) = broadcast::channel(128);
        let shutdown = CancellationToken::new();

        let store = ConversationStore::new(
            api,
            credential,
            event_rx,
            event_tx.downgrade(),
            broadcast_tx.clone(),
            shutdown.clone(),
        );
        let task = tokio::spawn(store.run());

        MountedStore {
            handle: StoreHandle {
                event_tx,
                broadcast_tx,
                shutdown,
            },
            events,
            task,
        }
    }

    pub async fn on_send(&self, text: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(Event::SendRequested { text: text.into() })
            .await
    }

    pub async fn on_edit(&self, id: MessageId, text: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(Event::EditRequested {
            id,
            text: text.into(),
        })
        .await
    }

    pub async fn on_delete(&self, id: MessageId) -> Result<(), StoreError> {
        self.dispatch(Event::DeleteRequested { id }).await
    }

    /// Subscribe to view updates
    #[allow(dead_code)] // Additional render surfaces
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Tear the store down; the log is discarded and late results are dropped
    pub fn unmount(&self) {
        self.shutdown.cancel();
    }

    async fn dispatch(&self, event: Event) -> Result<(), StoreError> {
        if self.shutdown.is_cancelled() {
            return Err(StoreError::Closed);
        }
        self.event_tx.send(event).await.map_err(|_| StoreError::Closed)
    }
}
