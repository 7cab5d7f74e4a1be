//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use enrollhub_core::types::id::UserId;

use super::priority::Priority;
use super::role::UserRole;
use super::status::UserStatus;

/// A person who can hold registrations.
///
/// Accounts are provisioned by the identity collaborator; the engine reads
/// the role, status, and investiture level.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Human-readable name.
    pub display_name: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Role at the event.
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// Investiture level, compared against `classes.min_level` by the caller.
    pub level: i32,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates an active user.
    pub fn new(display_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: UserId::new(),
            display_name: display_name.into(),
            email: None,
            role,
            status: UserStatus::Active,
            level: 0,
            created_at: Utc::now(),
        }
    }

    /// Sets the investiture level.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Admission priority derived from the role.
    pub fn priority(&self) -> Priority {
        Priority::from_role(self.role)
    }

    /// Whether the account may hold registrations.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
