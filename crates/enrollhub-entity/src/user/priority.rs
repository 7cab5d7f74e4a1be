//! Admission priority derived from a participant's role.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::role::UserRole;

/// How the engine treats a participant when a session is full.
///
/// Resolved once per operation from the participant's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Students. Waitlisted for the whole group when any session is full.
    Standard,
    /// Staff, instructors, directors, admins. Placed per session.
    Priority,
}

impl Priority {
    /// Maps a role to its admission priority.
    pub fn from_role(role: UserRole) -> Self {
        if role.is_student() {
            Self::Standard
        } else {
            Self::Priority
        }
    }

    /// Whether this is the priority variant.
    pub fn is_priority(&self) -> bool {
        matches!(self, Self::Priority)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Priority => write!(f, "priority"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_students_are_standard() {
        assert_eq!(Priority::from_role(UserRole::Student), Priority::Standard);
        for role in [
            UserRole::Staff,
            UserRole::Instructor,
            UserRole::Director,
            UserRole::Admin,
        ] {
            assert!(Priority::from_role(role).is_priority(), "{role} should be priority");
        }
    }
}
