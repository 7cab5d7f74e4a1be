//! Registration entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use enrollhub_core::types::id::{ClassId, RegistrationId, UserId};

use super::status::RegistrationStatus;

/// The join between a participant and one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    /// Unique registration identifier.
    pub id: RegistrationId,
    /// The participant.
    pub user_id: UserId,
    /// The class.
    pub class_id: ClassId,
    /// Seat or queue.
    pub status: RegistrationStatus,
    /// 1-based queue position; `Some` iff waitlisted.
    pub position: Option<i32>,
    /// When the registration was created.
    pub created_at: DateTime<Utc>,
    /// When the registration last changed status or position.
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Whether this registration holds a seat.
    pub fn is_enrolled(&self) -> bool {
        self.status == RegistrationStatus::Enrolled
    }

    /// Whether this registration is queued.
    pub fn is_waitlisted(&self) -> bool {
        self.status == RegistrationStatus::Waitlisted
    }
}

/// Data required to insert a registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
    /// The participant.
    pub user_id: UserId,
    /// The class.
    pub class_id: ClassId,
    /// Initial status.
    pub status: RegistrationStatus,
    /// Queue position for waitlisted inserts.
    pub position: Option<i32>,
}

impl NewRegistration {
    /// An enrolled registration.
    pub fn enrolled(user_id: UserId, class_id: ClassId) -> Self {
        Self {
            user_id,
            class_id,
            status: RegistrationStatus::Enrolled,
            position: None,
        }
    }

    /// A waitlisted registration at `position`.
    pub fn waitlisted(user_id: UserId, class_id: ClassId, position: i32) -> Self {
        Self {
            user_id,
            class_id,
            status: RegistrationStatus::Waitlisted,
            position: Some(position),
        }
    }

    /// Materializes the row with a fresh id and timestamps.
    pub fn into_registration(self) -> Registration {
        let now = Utc::now();
        Registration {
            id: RegistrationId::new(),
            user_id: self.user_id,
            class_id: self.class_id,
            status: self.status,
            position: self.position,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pair_status_with_position() {
        let user = UserId::new();
        let class = ClassId::new();

        let enrolled = NewRegistration::enrolled(user, class).into_registration();
        assert!(enrolled.is_enrolled());
        assert_eq!(enrolled.position, None);

        let queued = NewRegistration::waitlisted(user, class, 3).into_registration();
        assert!(queued.is_waitlisted());
        assert_eq!(queued.position, Some(3));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "Enrolled".parse::<RegistrationStatus>().ok(),
            Some(RegistrationStatus::Enrolled)
        );
        assert!("pending".parse::<RegistrationStatus>().is_err());
    }
}
