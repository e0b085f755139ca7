//! Application state shared across all handlers.

use std::sync::Arc;

use dormdesk_core::config::AppConfig;
use dormdesk_realtime::ChatEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The real-time chat engine.
    pub chat: ChatEngine,
}
