//! Shared domain types.

pub mod id;

pub use id::{IssueId, MessageId, UserId};
