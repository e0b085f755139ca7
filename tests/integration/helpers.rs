//! Shared test helpers for integration tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use dormdesk_core::config::realtime::RealtimeConfig;
use dormdesk_realtime::{ChatEngine, ConnectionHandle, InboundEvent, OutboundEvent};
use dormdesk_store::MemoryMessageStore;

/// A chat engine over an in-memory log, with helpers to attach fake
/// clients whose sockets are plain mpsc receivers.
pub struct TestChat {
    /// The engine under test.
    pub engine: ChatEngine,
    /// Direct store access for assertions.
    pub store: Arc<MemoryMessageStore>,
}

/// One fake connected client.
pub struct TestClient {
    /// The connection handle registered with the router.
    pub handle: Arc<ConnectionHandle>,
    rx: mpsc::Receiver<OutboundEvent>,
}

impl TestChat {
    /// Create a fresh engine and store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryMessageStore::new());
        let engine = ChatEngine::new(RealtimeConfig::default(), store.clone());
        Self { engine, store }
    }

    /// Attach a new client connection.
    pub fn connect(&self) -> TestClient {
        let (handle, rx) = self.engine.router.register_connection();
        TestClient { handle, rx }
    }

    /// Dispatch an event as if `client` had sent it.
    pub async fn send(&self, client: &TestClient, event: InboundEvent) {
        self.engine
            .router
            .handle_event(&client.handle.id, event)
            .await;
    }

    /// Disconnect a client.
    pub fn disconnect(&self, client: &TestClient) {
        self.engine.router.disconnect(&client.handle.id);
    }
}

impl TestClient {
    /// Drain every event currently buffered for this client.
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
