//! In-memory message log backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use dormdesk_core::types::{IssueId, MessageId};
use dormdesk_core::{AppError, AppResult};
use dormdesk_entity::{ChatMessage, MessageDraft};

use crate::MessageStore;

/// In-process message log, one append-ordered vector per issue.
///
/// Each log entry's timestamp is clamped to the previous entry's, so a
/// wall-clock step backwards never reorders a log.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    /// Issue ID → messages in append order.
    logs: DashMap<IssueId, Vec<ChatMessage>>,
}

impl MemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            logs: DashMap::new(),
        }
    }

    /// Number of messages stored for an issue.
    pub fn len(&self, issue_id: &IssueId) -> usize {
        self.logs.get(issue_id).map(|log| log.len()).unwrap_or(0)
    }

    /// Whether the issue has no messages.
    pub fn is_empty(&self, issue_id: &IssueId) -> bool {
        self.len(issue_id) == 0
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(&self, draft: MessageDraft) -> AppResult<ChatMessage> {
        let mut log = self.logs.entry(draft.issue_id.clone()).or_default();

        let mut timestamp = Utc::now();
        if let Some(last) = log.last() {
            timestamp = timestamp.max(last.timestamp);
        }

        let message = ChatMessage {
            id: MessageId::generate(),
            issue_id: draft.issue_id,
            sender_id: draft.sender_id,
            sender_role: draft.sender_role,
            text: draft.text,
            timestamp,
            sent: true,
            read: false,
            read_at: None,
        };

        log.push(message.clone());

        debug!(
            message_id = %message.id,
            issue_id = %message.issue_id,
            "Message appended to log"
        );

        Ok(message)
    }

    async fn get(
        &self,
        issue_id: &IssueId,
        message_id: &MessageId,
    ) -> AppResult<Option<ChatMessage>> {
        Ok(self
            .logs
            .get(issue_id)
            .and_then(|log| log.iter().find(|m| &m.id == message_id).cloned()))
    }

    async fn mark_read(
        &self,
        issue_id: &IssueId,
        message_id: &MessageId,
        read_at: DateTime<Utc>,
    ) -> AppResult<ChatMessage> {
        let mut log = self
            .logs
            .get_mut(issue_id)
            .ok_or_else(|| AppError::not_found(format!("No message log for issue {issue_id}")))?;

        let message = log
            .iter_mut()
            .find(|m| &m.id == message_id)
            .ok_or_else(|| AppError::not_found(format!("Message {message_id} not found")))?;

        if !message.read {
            message.read = true;
            message.read_at = Some(read_at);
        }

        Ok(message.clone())
    }

    async fn list(
        &self,
        issue_id: &IssueId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<ChatMessage>> {
        let messages = self
            .logs
            .get(issue_id)
            .map(|log| match since {
                Some(since) => log.iter().filter(|m| m.timestamp > since).cloned().collect(),
                None => log.to_vec(),
            })
            .unwrap_or_default();

        Ok(messages)
    }
}
