//! Presence record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dormdesk_core::types::IssueId;

/// Ephemeral presence state for one user.
///
/// Records are created lazily on a user's first event and are never
/// removed — an offline record keeps its `last_active` value so clients
/// can render "last seen" across reconnects, until process restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// True while the user has at least one live connection.
    pub online: bool,
    /// Updated on register, join, send, and mark-read events.
    pub last_active: DateTime<Utc>,
    /// The chat the user currently has open, if any.
    pub current_chat: Option<IssueId>,
}

impl PresenceRecord {
    /// A fresh online record with no current chat.
    pub fn online_now() -> Self {
        Self {
            online: true,
            last_active: Utc::now(),
            current_chat: None,
        }
    }
}

/// Answer to a presence query about one user relative to one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceQuery {
    /// Whether the user is online.
    pub online: bool,
    /// Last activity time; `None` for a user never seen.
    pub last_active: Option<DateTime<Utc>>,
    /// Whether the user verifiably sits in the queried chat room.
    pub is_in_channel: bool,
}

impl PresenceQuery {
    /// The benign default for an unknown user.
    pub fn unknown() -> Self {
        Self {
            online: false,
            last_active: None,
            is_in_channel: false,
        }
    }
}
