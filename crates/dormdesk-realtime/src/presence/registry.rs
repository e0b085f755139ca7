//! Presence registry — per-user online/offline/current-chat state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use dormdesk_core::types::{IssueId, UserId};

use crate::connection::pool::ConnectionPool;
use crate::room::registry::RoomRegistry;

use super::record::{PresenceQuery, PresenceRecord};

/// Tracks presence state for all users ever seen by this process.
///
/// Like [`RoomRegistry`](crate::room::registry::RoomRegistry), this is a
/// plain struct mutated only by the router under the shared chat-state
/// lock.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    /// User ID → presence record.
    records: HashMap<UserId, PresenceRecord>,
}

impl PresenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a user online and bumps their activity time. The current
    /// chat is left untouched; only `leave`, guarded, and disconnect
    /// clear it.
    pub fn set_online(&mut self, user_id: &UserId) {
        self.records
            .entry(user_id.clone())
            .and_modify(|record| {
                record.online = true;
                record.last_active = Utc::now();
            })
            .or_insert_with(PresenceRecord::online_now);
    }

    /// Marks a user offline, clears their current chat, and returns the
    /// final activity time for the offline broadcast.
    pub fn set_offline(&mut self, user_id: &UserId) -> DateTime<Utc> {
        let now = Utc::now();
        let record = self
            .records
            .entry(user_id.clone())
            .or_insert_with(PresenceRecord::online_now);
        record.online = false;
        record.last_active = now;
        record.current_chat = None;
        now
    }

    /// Records that a user has this chat open. Idempotent.
    pub fn enter_channel(&mut self, user_id: &UserId, issue_id: &IssueId) {
        let record = self
            .records
            .entry(user_id.clone())
            .or_insert_with(PresenceRecord::online_now);
        record.current_chat = Some(issue_id.clone());
    }

    /// Clears a user's current chat, but only if it matches `issue_id` —
    /// a stale leave for an already-superseded chat must not clobber the
    /// new one.
    pub fn leave_channel(&mut self, user_id: &UserId, issue_id: &IssueId) {
        if let Some(record) = self.records.get_mut(user_id) {
            if record.current_chat.as_ref() == Some(issue_id) {
                record.current_chat = None;
            }
        }
    }

    /// Bumps a user's activity time to now.
    pub fn touch(&mut self, user_id: &UserId) {
        self.touch_at(user_id, Utc::now());
    }

    /// Bumps a user's activity time to a specific instant.
    pub fn touch_at(&mut self, user_id: &UserId, at: DateTime<Utc>) {
        if let Some(record) = self.records.get_mut(user_id) {
            record.last_active = at;
        }
    }

    /// A copy of a user's presence record, if one exists.
    pub fn snapshot(&self, user_id: &UserId) -> Option<PresenceRecord> {
        self.records.get(user_id).cloned()
    }

    /// Answers "is this user online, and are they really in this chat?".
    ///
    /// `is_in_channel` requires both the presence record naming the chat
    /// AND a live session of the user sitting in the room's member set.
    /// The room cross-check keeps the answer truthful if the two
    /// structures ever disagree.
    pub fn query(
        &self,
        user_id: &UserId,
        issue_id: &IssueId,
        rooms: &RoomRegistry,
        pool: &ConnectionPool,
    ) -> PresenceQuery {
        let Some(record) = self.records.get(user_id) else {
            return PresenceQuery::unknown();
        };

        let mut is_in_channel = record.current_chat.as_ref() == Some(issue_id);
        if is_in_channel {
            is_in_channel = rooms
                .members_of(issue_id)
                .iter()
                .any(|conn_id| pool.resolve_user(conn_id).as_ref() == Some(user_id));
        }

        PresenceQuery {
            online: record.online,
            last_active: Some(record.last_active),
            is_in_channel,
        }
    }
}
