//! Mock implementations for testing
//!
//! These mocks enable integration testing of the store without real I/O.

use super::traits::*;
use super::{StoreEvent, StoreHandle};
use crate::api::ApiError;
use crate::session::Credential;
use crate::state_machine::{ChatState, EditedMessage, Exchange, MessageId};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;

pub const TEST_TOKEN: &str = "test-token";

// ============================================================================
// Mock Chat Backend
// ============================================================================

/// A call as the backend saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Send {
        text: String,
        token: String,
    },
    Edit {
        id: MessageId,
        text: String,
        token: String,
    },
    Delete {
        id: MessageId,
        token: String,
    },
}

/// Mock backend that returns queued responses.
///
/// A gated mock holds every call until [`MockChatApi::release`] hands out a
/// permit, which lets tests observe the in-flight state. Permits are granted
/// in call order.
pub struct MockChatApi {
    sends: Mutex<VecDeque<Result<Exchange, ApiError>>>,
    edits: Mutex<VecDeque<Result<EditedMessage, ApiError>>>,
    deletes: Mutex<VecDeque<Result<(), ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Semaphore>,
}

#[allow(dead_code)]
impl MockChatApi {
    /// Calls resolve immediately
    pub fn new() -> Self {
        Self {
            sends: Mutex::new(VecDeque::new()),
            edits: Mutex::new(VecDeque::new()),
            deletes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Calls wait for [`MockChatApi::release`]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn queue_send(&self, response: Result<Exchange, ApiError>) {
        self.sends.lock().unwrap().push_back(response);
    }

    pub fn queue_edit(&self, response: Result<EditedMessage, ApiError>) {
        self.edits.lock().unwrap().push_back(response);
    }

    pub fn queue_delete(&self, response: Result<(), ApiError>) {
        self.deletes.lock().unwrap().push_back(response);
    }

    /// Let `n` held calls proceed
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }
}

impl Default for MockChatApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic backend failure used across tests
pub fn server_error() -> ApiError {
    ApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "Internal Service Error")
}

fn nothing_queued() -> ApiError {
    ApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "No mock response queued")
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn send_message(
        &self,
        text: &str,
        credential: &Credential,
    ) -> Result<Exchange, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall::Send {
            text: text.to_string(),
            token: credential.token().to_string(),
        });
        self.pass_gate().await;
        self.sends
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued()))
    }

    async fn edit_message(
        &self,
        id: MessageId,
        text: &str,
        credential: &Credential,
    ) -> Result<EditedMessage, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall::Edit {
            id,
            text: text.to_string(),
            token: credential.token().to_string(),
        });
        self.pass_gate().await;
        self.edits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued()))
    }

    async fn delete_message(&self, id: MessageId, credential: &Credential) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(RecordedCall::Delete {
            id,
            token: credential.token().to_string(),
        });
        self.pass_gate().await;
        self.deletes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued()))
    }
}

// ============================================================================
// Test Store
// ============================================================================

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);
const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// A mounted store wired to a [`MockChatApi`]
pub struct TestStore {
    pub handle: StoreHandle,
    pub events: broadcast::Receiver<StoreEvent>,
    pub api: Arc<MockChatApi>,
    task: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestStore {
    /// Mount a store and consume its initial (empty) view
    pub async fn mount(api: MockChatApi) -> Self {
        let api = Arc::new(api);
        let mounted = StoreHandle::mount(api.clone(), Credential::new(TEST_TOKEN));
        let mut store = Self {
            handle: mounted.handle,
            events: mounted.events,
            api,
            task: mounted.task,
        };
        let initial = store.next_update().await;
        assert_eq!(initial, ChatState::new(), "store must mount with an empty log");
        store
    }

    /// Next event, or `None` on timeout
    pub async fn next_event(&mut self, timeout: Duration) -> Option<StoreEvent> {
        match tokio::time::timeout(timeout, self.events.recv()).await {
            Ok(Ok(event)) => Some(event),
            _ => None,
        }
    }

    /// Next `Updated` view, skipping scroll signals
    pub async fn next_update(&mut self) -> ChatState {
        loop {
            match self.next_event(EVENT_TIMEOUT).await {
                Some(StoreEvent::Updated(state)) => return state,
                Some(StoreEvent::ScrollToBottom) => continue,
                None => panic!("timed out waiting for a view update"),
            }
        }
    }

    /// Next event must be a scroll signal
    pub async fn expect_scroll(&mut self) {
        let event = self.next_event(EVENT_TIMEOUT).await;
        assert_eq!(event, Some(StoreEvent::ScrollToBottom));
    }

    /// Wait for a view matching `predicate`
    pub async fn wait_for_state(&mut self, predicate: impl Fn(&ChatState) -> bool) -> ChatState {
        loop {
            let state = self.next_update().await;
            if predicate(&state) {
                return state;
            }
        }
    }

    /// Collect events until the store has been quiet for a moment
    pub async fn drain(&mut self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event(QUIET_PERIOD).await {
            events.push(event);
        }
        events
    }

    /// Unmount and wait for the store task to finish
    pub async fn unmount(self) {
        self.handle.unmount();
        tokio::time::timeout(EVENT_TIMEOUT, self.task)
            .await
            .expect("store did not stop")
            .expect("store task panicked");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::StoreError;
    use crate::state_machine::state::GENERIC_FAILURE;
    use crate::state_machine::Message;

    fn scroll_count(events: &[StoreEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, StoreEvent::ScrollToBottom))
            .count()
    }

    /// Send through a gated mock and wait for the exchange to land
    async fn seed(store: &mut TestStore, exchange: Exchange) {
        let text = exchange.messages[0].text.clone();
        store.api.queue_send(Ok(exchange));
        store.handle.on_send(text).await.unwrap();
        store.api.release(1);
        store.wait_for_state(|s| !s.pending).await;
        store.drain().await;
    }

    #[tokio::test]
    async fn test_mock_returns_queued_then_errors() {
        let api = MockChatApi::new();
        api.queue_delete(Ok(()));
        let credential = Credential::new(TEST_TOKEN);

        assert!(api.delete_message(MessageId(1), &credential).await.is_ok());
        assert!(api.delete_message(MessageId(1), &credential).await.is_err());
        assert_eq!(api.recorded_calls().len(), 2);
    }

    /// Empty log, Send("Hello"), backend answers 101/102
    #[tokio::test]
    async fn test_send_end_to_end() {
        let api = MockChatApi::gated();
        api.queue_send(Ok(Exchange::new(
            Message::user(101, "Hello"),
            Message::bot(102, "Hi there"),
        )));
        let mut store = TestStore::mount(api).await;

        store.handle.on_send("Hello").await.unwrap();

        let sending = store.next_update().await;
        assert_eq!(sending.log, vec![Message::placeholder("Hello")]);
        assert!(sending.pending);
        store.expect_scroll().await;

        store.api.release(1);

        let done = store.next_update().await;
        assert_eq!(
            done.log,
            vec![Message::user(101, "Hello"), Message::bot(102, "Hi there")]
        );
        assert!(!done.pending);
        assert_eq!(done.last_error, None);
        store.expect_scroll().await;

        assert!(store.drain().await.is_empty());
        store.unmount().await;
    }

    #[tokio::test]
    async fn test_send_failure_rolls_back() {
        let api = MockChatApi::gated();
        api.queue_send(Ok(Exchange::new(
            Message::user(101, "first"),
            Message::bot(102, "reply"),
        )));
        api.queue_send(Err(server_error()));
        let mut store = TestStore::mount(api).await;
        seed_from_queue(&mut store, "first").await;

        store.handle.on_send("second").await.unwrap();
        let sending = store.next_update().await;
        assert!(sending.has_placeholder());

        store.api.release(1);
        let failed = store.wait_for_state(|s| !s.pending).await;
        assert_eq!(
            failed.log,
            vec![Message::user(101, "first"), Message::bot(102, "reply")]
        );
        assert_eq!(failed.last_error.as_deref(), Some(GENERIC_FAILURE));
    }

    /// Like `seed`, but the exchange is already queued
    async fn seed_from_queue(store: &mut TestStore, text: &str) {
        store.handle.on_send(text).await.unwrap();
        store.api.release(1);
        store.wait_for_state(|s| !s.pending).await;
        store.drain().await;
    }

    #[tokio::test]
    async fn test_whitespace_send_does_nothing() {
        let mut store = TestStore::mount(MockChatApi::new()).await;

        store.handle.on_send("   ").await.unwrap();

        assert!(store.drain().await.is_empty());
        assert!(store.api.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_credential_attached_to_every_call() {
        let api = MockChatApi::new();
        api.queue_send(Ok(Exchange::new(
            Message::user(101, "hi"),
            Message::bot(102, "hello"),
        )));
        api.queue_edit(Ok(EditedMessage {
            id: MessageId(101),
            text: "hey!".to_string(),
        }));
        api.queue_delete(Ok(()));
        let mut store = TestStore::mount(api).await;

        store.handle.on_send("hi").await.unwrap();
        store.wait_for_state(|s| s.find(MessageId(101)).is_some()).await;
        store.handle.on_edit(MessageId(101), "hey").await.unwrap();
        store
            .wait_for_state(|s| s.find(MessageId(101)).is_some_and(|m| m.text == "hey!"))
            .await;
        store.handle.on_delete(MessageId(101)).await.unwrap();
        store.wait_for_state(|s| s.find(MessageId(101)).is_none()).await;

        let calls = store.api.recorded_calls();
        assert_eq!(
            calls,
            vec![
                RecordedCall::Send {
                    text: "hi".to_string(),
                    token: TEST_TOKEN.to_string()
                },
                RecordedCall::Edit {
                    id: MessageId(101),
                    text: "hey".to_string(),
                    token: TEST_TOKEN.to_string()
                },
                RecordedCall::Delete {
                    id: MessageId(101),
                    token: TEST_TOKEN.to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_edit_optimistic_then_server_text() {
        let mut store = TestStore::mount(MockChatApi::gated()).await;
        seed(
            &mut store,
            Exchange::new(Message::user(5, "a"), Message::bot(6, "reply")),
        )
        .await;
        store.api.queue_edit(Ok(EditedMessage {
            id: MessageId(5),
            text: "b-normalized".to_string(),
        }));

        store.handle.on_edit(MessageId(5), "b").await.unwrap();
        let optimistic = store.next_update().await;
        assert_eq!(optimistic.log[0], Message::user(5, "b"));

        store.api.release(1);
        let done = store.next_update().await;
        assert_eq!(done.log[0], Message::user(5, "b-normalized"));

        // Edits never scroll
        assert_eq!(scroll_count(&store.drain().await), 0);
    }

    #[tokio::test]
    async fn test_edit_failure_restores_original() {
        let mut store = TestStore::mount(MockChatApi::gated()).await;
        seed(
            &mut store,
            Exchange::new(Message::user(5, "a"), Message::bot(6, "reply")),
        )
        .await;
        store.api.queue_edit(Err(server_error()));

        store.handle.on_edit(MessageId(5), "b").await.unwrap();
        assert_eq!(store.next_update().await.log[0].text, "b");

        store.api.release(1);
        let failed = store.next_update().await;
        assert_eq!(
            failed.log,
            vec![Message::user(5, "a"), Message::bot(6, "reply")]
        );
        assert_eq!(failed.last_error.as_deref(), Some(GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn test_delete_waits_for_backend() {
        let mut store = TestStore::mount(MockChatApi::gated()).await;
        seed(
            &mut store,
            Exchange::new(Message::user(5, "a"), Message::bot(6, "reply")),
        )
        .await;
        store.api.queue_delete(Err(server_error()));
        store.api.queue_delete(Ok(()));

        store.handle.on_delete(MessageId(5)).await.unwrap();
        let requested = store.next_update().await;
        assert!(requested.find(MessageId(5)).is_some());

        store.api.release(1);
        let failed = store.next_update().await;
        assert_eq!(failed.find(MessageId(5)), Some(&Message::user(5, "a")));
        assert_eq!(failed.last_error.as_deref(), Some(GENERIC_FAILURE));

        // Retrying clears the error before the call resolves
        store.handle.on_delete(MessageId(5)).await.unwrap();
        let retried = store.next_update().await;
        assert_eq!(retried.last_error, None);
        assert!(retried.find(MessageId(5)).is_some());

        store.api.release(1);
        let deleted = store.next_update().await;
        assert_eq!(deleted.log, vec![Message::bot(6, "reply")]);
        assert_eq!(scroll_count(&store.drain().await), 0);
    }

    #[tokio::test]
    async fn test_concurrent_edit_and_delete_on_different_messages() {
        let mut store = TestStore::mount(MockChatApi::gated()).await;
        seed(
            &mut store,
            Exchange::new(Message::user(101, "one"), Message::bot(102, "r1")),
        )
        .await;
        seed(
            &mut store,
            Exchange::new(Message::user(103, "two"), Message::bot(104, "r2")),
        )
        .await;
        store.api.queue_edit(Ok(EditedMessage {
            id: MessageId(103),
            text: "two, edited".to_string(),
        }));
        store.api.queue_delete(Ok(()));

        store.handle.on_edit(MessageId(103), "two, edited").await.unwrap();
        store.handle.on_delete(MessageId(101)).await.unwrap();
        store.api.release(2);

        let done = store
            .wait_for_state(|s| s.log.len() == 3 && !s.log.iter().any(|m| m.id == MessageId(101)))
            .await;
        assert_eq!(
            done.log,
            vec![
                Message::bot(102, "r1"),
                Message::user(103, "two, edited"),
                Message::bot(104, "r2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_while_editing() {
        let mut store = TestStore::mount(MockChatApi::gated()).await;
        seed(
            &mut store,
            Exchange::new(Message::user(5, "a"), Message::bot(6, "reply")),
        )
        .await;
        store.api.queue_edit(Err(server_error()));
        store.api.queue_send(Ok(Exchange::new(
            Message::user(7, "next"),
            Message::bot(8, "ok"),
        )));

        // Edit goes out first, then a send; both are held
        store.handle.on_edit(MessageId(5), "b").await.unwrap();
        store.handle.on_send("next").await.unwrap();
        store.wait_for_state(ChatState::has_placeholder).await;

        store.api.release(2);
        let done = store
            .wait_for_state(|s| !s.pending && s.log[0].text == "a")
            .await;
        assert_eq!(
            done.log,
            vec![
                Message::user(5, "a"),
                Message::bot(6, "reply"),
                Message::user(7, "next"),
                Message::bot(8, "ok"),
            ]
        );
    }

    #[tokio::test]
    async fn test_intents_on_placeholder_are_ignored() {
        let mut store = TestStore::mount(MockChatApi::gated()).await;

        store.handle.on_send("hello").await.unwrap();
        let sending = store.next_update().await;
        assert!(sending.pending);
        store.expect_scroll().await;

        store.handle.on_delete(MessageId::SENTINEL).await.unwrap();
        store
            .handle
            .on_edit(MessageId::SENTINEL, "changed")
            .await
            .unwrap();
        store.handle.on_send("again").await.unwrap();

        assert!(store.drain().await.is_empty());
        assert_eq!(store.api.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unmount_discards_late_results() {
        let api = MockChatApi::gated();
        api.queue_send(Ok(Exchange::new(
            Message::user(101, "Hello"),
            Message::bot(102, "Hi"),
        )));
        let mut store = TestStore::mount(api).await;
        let handle = store.handle.clone();
        let api = store.api.clone();

        store.handle.on_send("Hello").await.unwrap();
        store.next_update().await;

        store.unmount().await;
        api.release(1);

        assert_eq!(handle.on_send("after").await, Err(StoreError::Closed));
    }

    #[tokio::test]
    async fn test_store_stops_when_handles_dropped() {
        let mounted = StoreHandle::mount(MockChatApi::new(), Credential::new(TEST_TOKEN));
        drop(mounted.handle);

        tokio::time::timeout(EVENT_TIMEOUT, mounted.task)
            .await
            .expect("store kept running without handles")
            .unwrap();
    }
}
