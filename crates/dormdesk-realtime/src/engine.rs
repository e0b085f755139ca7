//! Top-level chat engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use dormdesk_core::config::realtime::RealtimeConfig;
use dormdesk_store::MessageStore;

use crate::router::ChatRouter;

/// Central chat engine coordinating the router and shutdown.
#[derive(Clone)]
pub struct ChatEngine {
    /// The socket event router.
    pub router: Arc<ChatRouter>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine").finish()
    }
}

impl ChatEngine {
    /// Creates a new chat engine over the given message log store.
    pub fn new(config: RealtimeConfig, store: Arc<dyn MessageStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let router = Arc::new(ChatRouter::new(config, store));

        info!("Chat engine initialized");

        Self {
            router,
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the chat engine.
    pub fn shutdown(&self) {
        info!("Shutting down chat engine");

        // Signal all tasks to stop
        let _ = self.shutdown_tx.send(());

        // Close all connections
        let connections = self.router.pool().all_connections();
        for conn in &connections {
            conn.mark_closed();
            self.router.pool().remove(&conn.id);
        }

        info!(count = connections.len(), "Chat engine shut down");
    }
}
