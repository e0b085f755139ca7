//! # dormdesk-api
//!
//! HTTP surface for DormDesk built on Axum: the WebSocket upgrade that
//! feeds the chat router, health probes, and the shared application
//! state. Identity verification happens upstream; chat events arrive
//! with their `userId` already vetted.

pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
