//! Read-receipt delivery states.

use serde::{Deserialize, Serialize};

use dormdesk_entity::ChatMessage;

use crate::presence::record::PresenceRecord;

/// The tri-state delivery indicator shown to a message's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    /// Persisted; the recipient is offline and has not acknowledged it.
    Sent,
    /// The recipient is online but has not acknowledged it.
    Delivered,
    /// The recipient acknowledged the message.
    Read,
}

impl DeliveryState {
    /// Lowercase label, matching the serde encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

/// Derives the delivery state of a message for its author's view.
///
/// A pure view over data that already exists elsewhere: the message's
/// read flag and the recipient's presence. Nothing is stored.
pub fn delivery_state(message: &ChatMessage, recipient: Option<&PresenceRecord>) -> DeliveryState {
    if message.read {
        DeliveryState::Read
    } else if recipient.is_some_and(|record| record.online) {
        DeliveryState::Delivered
    } else {
        DeliveryState::Sent
    }
}
