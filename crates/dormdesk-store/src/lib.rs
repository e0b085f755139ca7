//! # dormdesk-store
//!
//! The message log store boundary. The chat core only ever touches the
//! durable message log through the [`MessageStore`] trait; the in-process
//! [`MemoryMessageStore`] is the default backend. A document-store backend
//! can be swapped in without touching the real-time layer.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use dormdesk_core::AppResult;
use dormdesk_core::types::{IssueId, MessageId};
use dormdesk_entity::{ChatMessage, MessageDraft};

pub use memory::MemoryMessageStore;

/// Append-only, per-issue ordered message log.
///
/// Contract:
/// - `append` assigns the identifier and timestamp; timestamps are
///   monotonically nondecreasing within one issue's log.
/// - `mark_read` is the only permitted mutation and is idempotent: once a
///   message is read, further calls return it unchanged.
/// - `list` returns messages in append order.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Persist a draft, returning the stored record with its assigned
    /// identifier and timestamp.
    async fn append(&self, draft: MessageDraft) -> AppResult<ChatMessage>;

    /// Fetch a single message, or `None` if it does not exist.
    async fn get(
        &self,
        issue_id: &IssueId,
        message_id: &MessageId,
    ) -> AppResult<Option<ChatMessage>>;

    /// Apply the read transition and return the updated record.
    ///
    /// Returns a not-found error for an unknown message. Marking an
    /// already-read message is a no-op that returns the stored record
    /// with its first `readAt` intact.
    async fn mark_read(
        &self,
        issue_id: &IssueId,
        message_id: &MessageId,
        read_at: DateTime<Utc>,
    ) -> AppResult<ChatMessage>;

    /// List an issue's messages in append order, optionally restricted to
    /// those strictly after `since`.
    async fn list(
        &self,
        issue_id: &IssueId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<ChatMessage>>;
}
