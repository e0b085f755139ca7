//! Connection pool — tracks all active connections by connection ID.

use std::sync::Arc;

use dashmap::DashMap;

use dormdesk_core::types::UserId;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active connections.
///
/// User lookups scan the pool rather than maintaining a user index,
/// because identities are bound lazily after the connection is added.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// Connection ID → connection handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
        }
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Resolves a connection to its bound user, if any.
    pub fn resolve_user(&self, conn_id: &ConnectionId) -> Option<UserId> {
        self.by_id.get(conn_id).and_then(|entry| entry.value().user_id())
    }

    /// Gets all connections bound to a user.
    pub fn connections_for_user(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .filter(|entry| entry.value().user_id().as_ref() == Some(user_id))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Whether the user has at least one live connection.
    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        self.by_id
            .iter()
            .any(|entry| entry.value().user_id().as_ref() == Some(user_id))
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }
}
