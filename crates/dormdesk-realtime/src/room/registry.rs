//! Room registry — which connections are in which issue's chat room.

use std::collections::{HashMap, HashSet};

use dormdesk_core::types::IssueId;

use crate::connection::handle::ConnectionId;

/// Registry of all occupied chat rooms.
///
/// A connection belongs to at most one room: joining a room implicitly
/// leaves the previous one. Rooms with no members are removed entirely.
///
/// The registry is a plain struct; the router serializes all mutation
/// through the shared chat-state lock, so presence and room membership
/// always change together.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Issue ID → member connection IDs.
    rooms: HashMap<IssueId, HashSet<ConnectionId>>,
    /// Connection ID → its single current room (reverse index).
    membership: HashMap<ConnectionId, IssueId>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room, removing it from its previous room
    /// first. Returns the room that was implicitly left, if any.
    pub fn join(&mut self, issue_id: &IssueId, conn_id: ConnectionId) -> Option<IssueId> {
        let previous = self.membership.get(&conn_id).cloned();
        if previous.as_ref() == Some(issue_id) {
            return None;
        }
        if let Some(previous) = &previous {
            self.remove_member(previous, conn_id);
        }

        self.rooms
            .entry(issue_id.clone())
            .or_default()
            .insert(conn_id);
        self.membership.insert(conn_id, issue_id.clone());

        previous
    }

    /// Removes a connection from a room. Returns whether it was a member.
    pub fn leave(&mut self, issue_id: &IssueId, conn_id: ConnectionId) -> bool {
        if self.membership.get(&conn_id) != Some(issue_id) {
            return false;
        }
        self.membership.remove(&conn_id);
        self.remove_member(issue_id, conn_id);
        true
    }

    /// Removes a connection from whichever room it is in. Returns the room
    /// it left, if any. Used on disconnect.
    pub fn leave_current(&mut self, conn_id: ConnectionId) -> Option<IssueId> {
        let issue_id = self.membership.remove(&conn_id)?;
        self.remove_member(&issue_id, conn_id);
        Some(issue_id)
    }

    /// Returns the member connection IDs of a room (possibly empty).
    pub fn members_of(&self, issue_id: &IssueId) -> Vec<ConnectionId> {
        self.rooms
            .get(issue_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is a member of the given room.
    pub fn contains(&self, issue_id: &IssueId, conn_id: ConnectionId) -> bool {
        self.membership.get(&conn_id) == Some(issue_id)
    }

    /// The room a connection is currently in, if any.
    pub fn current_room(&self, conn_id: ConnectionId) -> Option<&IssueId> {
        self.membership.get(&conn_id)
    }

    /// Number of occupied rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn remove_member(&mut self, issue_id: &IssueId, conn_id: ConnectionId) {
        if let Some(members) = self.rooms.get_mut(issue_id) {
            members.remove(&conn_id);
            if members.is_empty() {
                self.rooms.remove(issue_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_membership_is_exclusive() {
        let mut rooms = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let issue_a = IssueId::new("issue-a");
        let issue_b = IssueId::new("issue-b");

        assert_eq!(rooms.join(&issue_a, conn), None);
        assert!(rooms.contains(&issue_a, conn));

        let left = rooms.join(&issue_b, conn);
        assert_eq!(left, Some(issue_a.clone()));
        assert!(!rooms.contains(&issue_a, conn));
        assert!(rooms.contains(&issue_b, conn));
        assert!(rooms.members_of(&issue_a).is_empty());
    }

    #[test]
    fn test_rejoin_same_room_is_idempotent() {
        let mut rooms = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let issue = IssueId::new("issue-1");

        assert_eq!(rooms.join(&issue, conn), None);
        assert_eq!(rooms.join(&issue, conn), None);
        assert_eq!(rooms.members_of(&issue).len(), 1);
    }

    #[test]
    fn test_empty_rooms_are_pruned() {
        let mut rooms = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let issue = IssueId::new("issue-1");

        rooms.join(&issue, conn);
        assert_eq!(rooms.room_count(), 1);

        assert!(rooms.leave(&issue, conn));
        assert_eq!(rooms.room_count(), 0);
        assert_eq!(rooms.current_room(conn), None);
    }

    #[test]
    fn test_leave_wrong_room_is_refused() {
        let mut rooms = RoomRegistry::new();
        let conn = Uuid::new_v4();
        rooms.join(&IssueId::new("issue-1"), conn);

        assert!(!rooms.leave(&IssueId::new("issue-2"), conn));
        assert!(rooms.contains(&IssueId::new("issue-1"), conn));
    }

    #[test]
    fn test_leave_current_on_disconnect() {
        let mut rooms = RoomRegistry::new();
        let conn_a = Uuid::new_v4();
        let conn_b = Uuid::new_v4();
        let issue = IssueId::new("issue-1");

        rooms.join(&issue, conn_a);
        rooms.join(&issue, conn_b);

        assert_eq!(rooms.leave_current(conn_a), Some(issue.clone()));
        assert_eq!(rooms.members_of(&issue), vec![conn_b]);
        assert_eq!(rooms.leave_current(conn_a), None);
    }
}
