//! Chat sender role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles allowed to author chat messages on an issue.
///
/// Students report issues; workers are assigned to resolve them. Every
/// message carries its author's role so clients can lay out the
/// conversation without a user lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    /// The student who reported the issue.
    Student,
    /// The worker assigned to the issue.
    Worker,
}

impl SenderRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SenderRole {
    type Err = dormdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "worker" => Ok(Self::Worker),
            _ => Err(dormdesk_core::AppError::validation(format!(
                "Invalid sender role: '{s}'. Expected one of: student, worker"
            ))),
        }
    }
}
