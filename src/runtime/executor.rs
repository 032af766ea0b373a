//! Conversation store executor

use super::traits::ChatApi;
use super::StoreEvent;

use crate::session::Credential;
use crate::state_machine::{transition, ChatState, Effect, Event, ScrollTracker};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Owns the conversation log and serializes every mutation of it
pub struct ConversationStore<A>
where
    A: ChatApi + 'static,
{
    state: ChatState,
    scroll: ScrollTracker,
    api: Arc<A>,
    credential: Credential,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the store stops once every handle and in-flight call is gone
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<StoreEvent>,
    shutdown: CancellationToken,
}

impl<A> ConversationStore<A>
where
    A: ChatApi + 'static,
{
    pub fn new(
        api: A,
        credential: Credential,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::WeakSender<Event>,
        broadcast_tx: broadcast::Sender<StoreEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            state: ChatState::new(),
            scroll: ScrollTracker::new(),
            api: Arc::new(api),
            credential,
            event_rx,
            event_tx,
            broadcast_tx,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Conversation store mounted");
        self.publish();

        // Process events in a loop until unmounted
        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                event = self.event_rx.recv() => match event {
                    Some(event) => self.process_event(event),
                    // Every handle dropped and nothing in flight
                    None => break,
                },
            }
        }

        tracing::info!(
            discarded_messages = self.state.log.len(),
            "Conversation store unmounted"
        );
    }

    fn process_event(&mut self, event: Event) {
        let kind = event.kind();
        let message_id = event.message_id();

        // Pure state transition
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(event = kind, ?message_id, reason = %e, "Intent rejected");
                return;
            }
        };

        tracing::debug!(
            event = kind,
            ?message_id,
            log_len = result.new_state.log.len(),
            pending = result.new_state.pending,
            "Applied transition"
        );
        self.state = result.new_state;

        // Render before any call goes out so optimistic state is visible
        self.publish();

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    /// Broadcast the current view and, if the log grew, a scroll signal
    fn publish(&mut self) {
        let _ = self
            .broadcast_tx
            .send(StoreEvent::Updated(self.state.clone()));
        if self.scroll.observe(&self.state.log) {
            let _ = self.broadcast_tx.send(StoreEvent::ScrollToBottom);
        }
    }

    /// Spawn the remote call for an effect; its outcome comes back as an event
    fn execute_effect(&self, effect: Effect) {
        let Some(event_tx) = self.event_tx.upgrade() else {
            return;
        };
        let api = self.api.clone();
        let credential = self.credential.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let event = tokio::select! {
                () = shutdown.cancelled() => return,
                event = perform(api.as_ref(), &credential, effect) => event,
            };
            // Store may have been unmounted meanwhile
            let _ = event_tx.send(event).await;
        });
    }
}

/// Run one remote call and translate its outcome into a store event
async fn perform<A: ChatApi + ?Sized>(api: &A, credential: &Credential, effect: Effect) -> Event {
    match effect {
        Effect::SendMessage { text } => match api.send_message(&text, credential).await {
            Ok(exchange) => Event::SendSucceeded { exchange },
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Send failed");
                Event::SendFailed
            }
        },

        Effect::EditMessage { id, text, previous } => {
            match api.edit_message(id, &text, credential).await {
                Ok(message) => Event::EditSucceeded { message },
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, kind = e.kind(), "Edit failed");
                    Event::EditFailed { previous }
                }
            }
        }

        Effect::DeleteMessage { id } => match api.delete_message(id, credential).await {
            Ok(()) => Event::DeleteSucceeded { id },
            Err(e) => {
                tracing::warn!(id = %id, error = %e, kind = e.kind(), "Delete failed");
                Event::DeleteFailed { id }
            }
        },
    }
}
