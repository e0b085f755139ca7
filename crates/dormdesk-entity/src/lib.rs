//! # dormdesk-entity
//!
//! Domain records for DormDesk. The serde representation of these types is
//! the wire encoding used by the real-time layer, so field names follow the
//! established client contract (`issueID`, `senderID`, `readAt`, ...).

pub mod message;
pub mod role;

pub use message::{ChatMessage, MessageDraft};
pub use role::SenderRole;
