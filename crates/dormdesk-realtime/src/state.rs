//! Combined in-memory chat state.

use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;

/// Room membership and presence, mutated together.
///
/// The two registries must never disagree (a presence record naming a
/// chat implies a session of that user in the room's member set), so the
/// router keeps them under one lock and commits each event's changes to
/// both before releasing it.
#[derive(Debug, Default)]
pub struct ChatState {
    /// Per-issue room membership.
    pub rooms: RoomRegistry,
    /// Per-user presence records.
    pub presence: PresenceRegistry,
}

impl ChatState {
    /// Creates empty chat state.
    pub fn new() -> Self {
        Self::default()
    }
}
