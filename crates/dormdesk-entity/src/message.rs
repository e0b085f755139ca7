//! Chat message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dormdesk_core::types::{IssueId, MessageId, UserId};

use crate::role::SenderRole;

/// One persisted entry in an issue's message log.
///
/// The serde shape of this struct is broadcast verbatim as the
/// `new_message` payload, so the field renames below are part of the
/// client contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Store-assigned identifier, unique within the issue's log.
    pub id: MessageId,
    /// Issue this message belongs to.
    #[serde(rename = "issueID")]
    pub issue_id: IssueId,
    /// Author of the message.
    #[serde(rename = "senderID")]
    pub sender_id: UserId,
    /// Author's role at send time.
    #[serde(rename = "senderRole")]
    pub sender_role: SenderRole,
    /// Message body, trimmed and non-empty.
    pub text: String,
    /// Server-assigned persistence time; nondecreasing within a log.
    pub timestamp: DateTime<Utc>,
    /// True once the log store has acknowledged persistence.
    pub sent: bool,
    /// True once a member other than the sender acknowledged the message.
    pub read: bool,
    /// When the message was read; `null` until the read transition.
    #[serde(rename = "readAt")]
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Whether `user` authored this message.
    pub fn is_from(&self, user: &UserId) -> bool {
        &self.sender_id == user
    }
}

/// The validated, not-yet-persisted form of a message.
///
/// The log store turns a draft into a [`ChatMessage`] by assigning the
/// identifier and timestamp at append time.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    /// Issue whose log the message is appended to.
    pub issue_id: IssueId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Author's role.
    pub sender_role: SenderRole,
    /// Trimmed message body.
    pub text: String,
}
