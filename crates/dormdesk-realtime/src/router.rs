//! Socket event router.
//!
//! One router instance serves every connection. Per connection it acts as
//! the protocol state machine (unregistered → registered → in a room),
//! dispatching inbound events to the registries and the message log and
//! fanning resulting events out to room members.
//!
//! Every event's registry changes are committed under a single write
//! guard on the shared [`ChatState`], which is never held across an
//! `.await`. Suspension happens only at the message-log boundary.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use dormdesk_core::config::realtime::RealtimeConfig;
use dormdesk_core::error::ErrorKind;
use dormdesk_core::types::{IssueId, MessageId, UserId};
use dormdesk_entity::ChatMessage;
use dormdesk_store::MessageStore;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::event::validator;
use crate::event::{InboundEvent, OutboundEvent};
use crate::receipt::{DeliveryState, delivery_state};
use crate::state::ChatState;

/// Routes inbound socket events to the registries and the message log.
pub struct ChatRouter {
    /// Room membership + presence, mutated atomically per event.
    state: RwLock<ChatState>,
    /// All live connections.
    pool: Arc<ConnectionPool>,
    /// The durable message log.
    store: Arc<dyn MessageStore>,
    /// Engine configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for ChatRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRouter").finish()
    }
}

impl ChatRouter {
    /// Creates a router over the given message log.
    pub fn new(config: RealtimeConfig, store: Arc<dyn MessageStore>) -> Self {
        Self {
            state: RwLock::new(ChatState::new()),
            pool: Arc::new(ConnectionPool::new()),
            store,
            config,
        }
    }

    /// The shared connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Registers a new connection and returns its handle plus the
    /// receiver the transport pumps outbound events from.
    pub fn register_connection(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.pool.add(handle.clone());

        info!(conn_id = %handle.id, "Client connected");

        (handle, rx)
    }

    /// Parses and dispatches a raw client frame.
    pub async fn handle_raw(&self, conn_id: &ConnectionId, raw: &str) {
        match serde_json::from_str::<InboundEvent>(raw) {
            Ok(event) => self.handle_event(conn_id, event).await,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "Unparseable client event");
                self.emit(
                    conn_id,
                    OutboundEvent::Error {
                        message: "Invalid event payload".to_string(),
                    },
                );
            }
        }
    }

    /// Dispatches one inbound event.
    pub async fn handle_event(&self, conn_id: &ConnectionId, event: InboundEvent) {
        match event {
            InboundEvent::RegisterUser { user_id } => self.on_register(conn_id, user_id),
            InboundEvent::JoinIssue { issue_id, user_id } => {
                self.on_join(conn_id, issue_id, user_id);
            }
            InboundEvent::LeaveIssue { issue_id } => self.on_leave(conn_id, issue_id),
            InboundEvent::GetUserPresence { user_id, issue_id } => {
                self.on_get_presence(conn_id, user_id, issue_id);
            }
            InboundEvent::SendMessage {
                issue_id,
                sender_id,
                sender_role,
                text,
                client_ref,
            } => {
                self.on_send(conn_id, issue_id, sender_id, sender_role, text, client_ref)
                    .await;
            }
            InboundEvent::TypingStart {
                issue_id,
                sender_id,
                sender_role,
            } => self.on_typing(conn_id, issue_id, sender_id, sender_role, true),
            InboundEvent::TypingStop {
                issue_id,
                sender_id,
            } => self.on_typing(conn_id, issue_id, sender_id, None, false),
            InboundEvent::MarkMessageRead {
                issue_id,
                message_id,
                reader_id,
            } => self.on_mark_read(conn_id, issue_id, message_id, reader_id).await,
            InboundEvent::GetChatHistory { issue_id, since } => {
                self.on_history(conn_id, issue_id, since).await;
            }
            InboundEvent::GetUnreadCount { issue_id, user_id } => {
                self.on_unread(conn_id, issue_id, user_id).await;
            }
        }
    }

    /// Tears down a closed connection: leaves its room, flips the user
    /// offline if this was their last session, and notifies peers.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        let Some(handle) = self.pool.remove(conn_id) else {
            return;
        };
        handle.mark_closed();
        let user_id = handle.user_id();

        let mut offline_at = None;
        let mut left_room = None;
        {
            let mut state = self.state_write();
            if let Some(user) = &user_id {
                if !self.pool.is_user_connected(user) {
                    offline_at = Some(state.presence.set_offline(user));
                }
            }
            if let Some(issue) = state.rooms.leave_current(handle.id) {
                let members = state.rooms.members_of(&issue);
                left_room = Some((issue, members));
            }
        }

        if let (Some(user), Some(last_active)) = (&user_id, offline_at) {
            self.broadcast_all(&OutboundEvent::UserOffline {
                user_id: user.clone(),
                last_active,
            });
        }

        if let (Some(user), Some((issue_id, members))) = (&user_id, left_room) {
            self.send_to_members(
                &members,
                &OutboundEvent::UserLeftChat {
                    user_id: user.clone(),
                    issue_id,
                },
            );
        }

        info!(conn_id = %conn_id, "Client disconnected");
    }

    /// The delivery indicator for a message, from its author's point of
    /// view, given the recipient to display it for.
    pub fn delivery_state_of(&self, message: &ChatMessage, recipient: &UserId) -> DeliveryState {
        let state = self.state_read();
        let record = state.presence.snapshot(recipient);
        delivery_state(message, record.as_ref())
    }

    // ── Event handlers ───────────────────────────────────────────

    fn on_register(&self, conn_id: &ConnectionId, user_id: UserId) {
        if user_id.is_blank() {
            return;
        }
        let Some(handle) = self.pool.get(conn_id) else {
            return;
        };
        if !handle.bind_user(&user_id) {
            warn!(conn_id = %conn_id, user_id = %user_id, "Connection already bound to another user");
            return;
        }

        self.state_write().presence.set_online(&user_id);

        debug!(conn_id = %conn_id, user_id = %user_id, "User registered");

        self.broadcast_all(&OutboundEvent::UserOnline {
            user_id,
            is_online: true,
            current_chat: None,
        });
    }

    fn on_join(&self, conn_id: &ConnectionId, issue_id: IssueId, user_id: Option<UserId>) {
        if let Err(err) = validator::validate_join(&issue_id) {
            self.emit(conn_id, OutboundEvent::Error { message: err.message });
            return;
        }
        let Some(handle) = self.pool.get(conn_id) else {
            return;
        };

        if let Some(user) = user_id.as_ref().filter(|user| !user.is_blank()) {
            if !handle.bind_user(user) {
                warn!(conn_id = %conn_id, user_id = %user, "Ignoring conflicting identity on join");
            }
        }
        let user_id = handle.user_id();

        let (members, other_users) = {
            let mut state = self.state_write();

            if let Some(user) = &user_id {
                state.presence.set_online(user);
                state.presence.enter_channel(user, &issue_id);
            }

            if let Some(previous) = state.rooms.join(&issue_id, handle.id) {
                debug!(conn_id = %conn_id, previous = %previous, "Implicitly left previous room");
            }

            let members = state.rooms.members_of(&issue_id);

            let mut other_users: Vec<UserId> = Vec::new();
            for member in &members {
                if member == &handle.id {
                    continue;
                }
                if let Some(other) = self.pool.resolve_user(member) {
                    if user_id.as_ref() != Some(&other) && !other_users.contains(&other) {
                        other_users.push(other);
                    }
                }
            }

            // Occupants whose presence drifted to another chat are pulled
            // back to this one; room membership is the ground truth.
            for other in &other_users {
                if state.presence.snapshot(other).is_some() {
                    state.presence.enter_channel(other, &issue_id);
                }
            }

            (members, other_users)
        };

        if let Some(user) = &user_id {
            self.broadcast_all(&OutboundEvent::UserOnline {
                user_id: user.clone(),
                is_online: true,
                current_chat: Some(issue_id.clone()),
            });
        }

        info!(conn_id = %conn_id, issue_id = %issue_id, "Joined issue room");

        handle.send(OutboundEvent::JoinedIssue {
            issue_id: issue_id.clone(),
            room_name: format!("issue_{issue_id}"),
            other_users_in_chat: other_users.clone(),
        });

        for member in &members {
            if member == &handle.id {
                continue;
            }
            if let Some(peer) = self.pool.get(member) {
                peer.send(OutboundEvent::UserJoinedChat {
                    user_id: user_id.clone(),
                    issue_id: issue_id.clone(),
                });
            }
        }

        // Tell the joiner who is already here, one event per occupant, so
        // a client opening the chat sees its partner without a round-trip.
        for other in &other_users {
            handle.send(OutboundEvent::UserJoinedChat {
                user_id: Some(other.clone()),
                issue_id: issue_id.clone(),
            });
        }
    }

    fn on_leave(&self, conn_id: &ConnectionId, issue_id: IssueId) {
        if issue_id.is_blank() {
            return;
        }
        let Some(handle) = self.pool.get(conn_id) else {
            return;
        };
        let Some(user_id) = handle.user_id() else {
            return;
        };

        let members = {
            let mut state = self.state_write();
            let was_member = state.rooms.leave(&issue_id, handle.id);
            state.presence.leave_channel(&user_id, &issue_id);
            if !was_member {
                return;
            }
            state.rooms.members_of(&issue_id)
        };

        debug!(conn_id = %conn_id, issue_id = %issue_id, "Left issue room");

        self.send_to_members(&members, &OutboundEvent::UserLeftChat { user_id, issue_id });
    }

    fn on_get_presence(
        &self,
        conn_id: &ConnectionId,
        user_id: UserId,
        issue_id: Option<IssueId>,
    ) {
        let event = {
            let state = self.state_read();
            match state.presence.snapshot(&user_id) {
                None => OutboundEvent::UserPresence {
                    user_id,
                    is_online: false,
                    last_active: None,
                    current_chat: None,
                },
                Some(record) => {
                    let is_in_channel = issue_id.as_ref().is_some_and(|issue| {
                        state
                            .presence
                            .query(&user_id, issue, &state.rooms, &self.pool)
                            .is_in_channel
                    });
                    let current_chat = if is_in_channel {
                        issue_id
                    } else {
                        record.current_chat
                    };
                    OutboundEvent::UserPresence {
                        user_id,
                        is_online: record.online,
                        last_active: Some(record.last_active),
                        current_chat,
                    }
                }
            }
        };

        self.emit(conn_id, event);
    }

    async fn on_send(
        &self,
        conn_id: &ConnectionId,
        issue_id: IssueId,
        sender_id: UserId,
        sender_role: String,
        text: String,
        client_ref: Option<String>,
    ) {
        let Some(handle) = self.pool.get(conn_id) else {
            return;
        };

        let draft = match validator::validate_send(&issue_id, &sender_id, &sender_role, &text) {
            Ok(draft) => draft,
            Err(err) => {
                handle.send(OutboundEvent::Error { message: err.message });
                return;
            }
        };

        // At-most-once: a failed append is reported to the sender and
        // never retried; nothing is fanned out.
        let message = match self.store.append(draft).await {
            Ok(message) => message,
            Err(err) => {
                warn!(conn_id = %conn_id, error = %err, "Message append failed");
                handle.send(OutboundEvent::Error {
                    message: "Failed to send message".to_string(),
                });
                return;
            }
        };

        let members = {
            let mut state = self.state_write();
            state.presence.touch(&sender_id);
            state.rooms.members_of(&issue_id)
        };

        debug!(message_id = %message.id, issue_id = %issue_id, "Message persisted, fanning out");

        self.send_to_members(&members, &OutboundEvent::NewMessage(message.clone()));

        handle.send(OutboundEvent::MessageSent {
            message_id: message.id,
            text: message.text,
            client_ref,
        });
    }

    fn on_typing(
        &self,
        conn_id: &ConnectionId,
        issue_id: IssueId,
        sender_id: UserId,
        sender_role: Option<String>,
        is_typing: bool,
    ) {
        if issue_id.is_blank() || sender_id.is_blank() {
            return;
        }

        let members = self.state_read().rooms.members_of(&issue_id);
        let event = OutboundEvent::UserTyping {
            issue_id,
            sender_id,
            sender_role,
            is_typing,
        };

        for member in &members {
            if member == conn_id {
                continue;
            }
            if let Some(peer) = self.pool.get(member) {
                peer.send(event.clone());
            }
        }
    }

    async fn on_mark_read(
        &self,
        conn_id: &ConnectionId,
        issue_id: IssueId,
        message_id: MessageId,
        reader_id: UserId,
    ) {
        let Some(handle) = self.pool.get(conn_id) else {
            return;
        };
        if let Err(err) = validator::validate_mark_read(&issue_id, &message_id, &reader_id) {
            handle.send(OutboundEvent::Error { message: err.message });
            return;
        }

        let message = match self.store.get(&issue_id, &message_id).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                handle.send(OutboundEvent::Error {
                    message: "Message not found".to_string(),
                });
                return;
            }
            Err(err) => {
                warn!(conn_id = %conn_id, error = %err, "Message lookup failed");
                handle.send(OutboundEvent::Error {
                    message: "Failed to mark message as read".to_string(),
                });
                return;
            }
        };

        // A sender cannot read their own message.
        if message.sender_id == reader_id {
            return;
        }

        let updated = match self.store.mark_read(&issue_id, &message_id, Utc::now()).await {
            Ok(updated) => updated,
            Err(err) if err.kind == ErrorKind::NotFound => {
                handle.send(OutboundEvent::Error {
                    message: "Message not found".to_string(),
                });
                return;
            }
            Err(err) => {
                warn!(conn_id = %conn_id, error = %err, "Read transition failed");
                handle.send(OutboundEvent::Error {
                    message: "Failed to mark message as read".to_string(),
                });
                return;
            }
        };

        let Some(read_at) = updated.read_at else {
            return;
        };

        let members = {
            let mut state = self.state_write();
            state.presence.touch(&reader_id);
            state.rooms.members_of(&issue_id)
        };

        self.send_to_members(
            &members,
            &OutboundEvent::MessageRead {
                issue_id,
                message_id,
                read_at,
                reader_id,
            },
        );
    }

    async fn on_history(
        &self,
        conn_id: &ConnectionId,
        issue_id: IssueId,
        since: Option<DateTime<Utc>>,
    ) {
        let Some(handle) = self.pool.get(conn_id) else {
            return;
        };

        match self.store.list(&issue_id, since).await {
            Ok(mut messages) => {
                let limit = self.config.history_limit;
                if messages.len() > limit {
                    // Keep the newest entries.
                    messages.drain(..messages.len() - limit);
                }
                handle.send(OutboundEvent::ChatHistory { issue_id, messages });
            }
            Err(err) => {
                warn!(conn_id = %conn_id, error = %err, "History load failed");
                handle.send(OutboundEvent::Error {
                    message: "Failed to load chat history".to_string(),
                });
            }
        }
    }

    async fn on_unread(&self, conn_id: &ConnectionId, issue_id: IssueId, user_id: UserId) {
        let Some(handle) = self.pool.get(conn_id) else {
            return;
        };

        match self.store.list(&issue_id, None).await {
            Ok(messages) => {
                let count = messages
                    .iter()
                    .filter(|m| !m.is_from(&user_id) && (!m.read || m.read_at.is_none()))
                    .count();
                handle.send(OutboundEvent::UnreadCount { issue_id, count });
            }
            Err(err) => {
                warn!(conn_id = %conn_id, error = %err, "Unread count failed");
                handle.send(OutboundEvent::Error {
                    message: "Failed to count unread messages".to_string(),
                });
            }
        }
    }

    // ── Emission helpers ─────────────────────────────────────────

    fn emit(&self, conn_id: &ConnectionId, event: OutboundEvent) {
        if let Some(handle) = self.pool.get(conn_id) {
            handle.send(event);
        }
    }

    fn broadcast_all(&self, event: &OutboundEvent) {
        for handle in self.pool.all_connections() {
            handle.send(event.clone());
        }
    }

    fn send_to_members(&self, members: &[ConnectionId], event: &OutboundEvent) {
        for member in members {
            if let Some(peer) = self.pool.get(member) {
                peer.send(event.clone());
            }
        }
    }

    fn state_read(&self) -> RwLockReadGuard<'_, ChatState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, ChatState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
