//! # dormdesk-realtime
//!
//! Real-time chat engine for DormDesk. Provides:
//!
//! - WebSocket connection handles and pool
//! - Per-issue chat rooms with exclusive membership
//! - User presence tracking (online/offline/current chat)
//! - The socket event router (join/leave/send/typing/read receipts)
//! - Read-receipt delivery states (sent/delivered/read)
//!
//! State is in-memory and single-process: rooms and presence are rebuilt
//! from client reconnects after a restart, while the message log itself
//! lives behind [`dormdesk_store::MessageStore`].

pub mod connection;
pub mod engine;
pub mod event;
pub mod presence;
pub mod receipt;
pub mod room;
pub mod router;
pub mod state;

pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use connection::pool::ConnectionPool;
pub use engine::ChatEngine;
pub use event::{InboundEvent, OutboundEvent};
pub use presence::registry::PresenceRegistry;
pub use receipt::{DeliveryState, delivery_state};
pub use room::registry::RoomRegistry;
pub use router::ChatRouter;
