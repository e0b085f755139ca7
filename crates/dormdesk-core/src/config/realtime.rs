//! Real-time chat engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) chat engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound message buffer size per connection. When a client falls
    /// this far behind, further events to it are dropped rather than
    /// queued unboundedly.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum number of messages returned by a chat history request.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_history_limit() -> usize {
    100
}
