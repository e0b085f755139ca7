//! User presence: online/offline state and current chat tracking.

pub mod record;
pub mod registry;

pub use record::{PresenceQuery, PresenceRecord};
pub use registry::PresenceRegistry;
