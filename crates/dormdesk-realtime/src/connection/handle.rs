//! Individual WebSocket connection handle.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use dormdesk_core::types::UserId;

use crate::event::OutboundEvent;

/// Unique connection identifier, assigned by the transport layer.
pub type ConnectionId = Uuid;

/// A handle to a single live client connection.
///
/// Holds the sender half of the connection's outbound event channel. The
/// user identity is not known at connect time — clients attach it with
/// their first `register_user` or `join_issue` event — so the binding is
/// applied lazily and is immutable once set.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// User bound to this connection, once known.
    user: RwLock<Option<UserId>>,
    /// Sender for outbound events.
    sender: mpsc::Sender<OutboundEvent>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(sender: mpsc::Sender<OutboundEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            user: RwLock::new(None),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// Bind this connection to a user. The first binding wins; a repeat of
    /// the same user is accepted, a conflicting one is refused.
    ///
    /// Returns whether the connection is bound to `user_id` afterwards.
    pub fn bind_user(&self, user_id: &UserId) -> bool {
        let mut user = self.user.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        match user.as_ref() {
            None => {
                *user = Some(user_id.clone());
                true
            }
            Some(existing) => existing == user_id,
        }
    }

    /// The user bound to this connection, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.user
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Push an outbound event to this connection.
    ///
    /// Delivery is best-effort: a full buffer drops the event, a closed
    /// channel marks the connection dead. Returns whether the event was
    /// accepted.
    pub fn send(&self, event: OutboundEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as closed.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
