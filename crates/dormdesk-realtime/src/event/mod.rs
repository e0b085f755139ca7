//! Wire event types and validation.
//!
//! Events are JSON objects tagged by a `type` field carrying the socket
//! event name. Variant and field spellings are the client contract and
//! must not change.

pub mod inbound;
pub mod outbound;
pub mod validator;

pub use inbound::InboundEvent;
pub use outbound::OutboundEvent;
