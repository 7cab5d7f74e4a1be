//! Results returned by [`AdmissionEngine`](super::AdmissionEngine)
//! operations.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use enrollhub_core::events::RegistrationEvent;
use enrollhub_core::types::id::{ClassId, RegistrationId, UserId};
use enrollhub_entity::registration::{Registration, RegistrationStatus};

/// Where one session of a group landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    /// The session.
    pub class_id: ClassId,
    /// The registration created for it.
    pub registration_id: RegistrationId,
    /// Seat or queue.
    pub status: RegistrationStatus,
    /// Queue position when waitlisted.
    pub position: Option<i32>,
}

impl From<&Registration> for SessionOutcome {
    fn from(reg: &Registration) -> Self {
        Self {
            class_id: reg.class_id,
            registration_id: reg.id,
            status: reg.status,
            position: reg.position,
        }
    }
}

/// Result of a registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterOutcome {
    /// `Enrolled` only when every session holds a seat.
    pub status: RegistrationStatus,
    /// Position in the requested class when queued there, else in the
    /// first queued session.
    pub position: Option<i32>,
    /// Number of sessions registered.
    pub sessions_affected: usize,
    /// Per-session detail in session order.
    pub sessions: Vec<SessionOutcome>,
    /// Events produced.
    pub events: Vec<RegistrationEvent>,
}

/// A waitlisted participant that moved into a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// The promoted registration.
    pub registration_id: RegistrationId,
    /// The promoted participant.
    pub user_id: UserId,
    /// The class the seat belongs to.
    pub class_id: ClassId,
}

/// Result of a drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropOutcome {
    /// Number of registrations removed.
    pub sessions_affected: usize,
    /// Promotions triggered by the freed seat, including backfills after
    /// evictions.
    pub promotions: Vec<Promotion>,
    /// Events produced.
    pub events: Vec<RegistrationEvent>,
}

/// One line of a class roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The participant.
    pub participant_id: UserId,
    /// The registration.
    pub registration_id: RegistrationId,
    /// Seat or queue.
    pub status: RegistrationStatus,
    /// Queue position when waitlisted.
    pub position: Option<i32>,
}

impl From<Registration> for RosterEntry {
    fn from(reg: Registration) -> Self {
        Self {
            participant_id: reg.user_id,
            registration_id: reg.id,
            status: reg.status,
            position: reg.position,
        }
    }
}

/// An enrollment on the same date that blocks an administrative
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    /// The session of the requested group that is blocked.
    pub session_class_id: ClassId,
    /// The class holding the conflicting seat.
    pub conflicting_class_id: ClassId,
    /// The conflicting registration.
    pub conflicting_registration_id: RegistrationId,
}

/// Result of an administrative assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AssignOutcome {
    /// The participant was registered as by a normal registration.
    Registered(RegisterOutcome),
    /// Nothing was written; the caller may force the assignment.
    ConflictDetected(ConflictInfo),
}

/// Seat counts of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAvailability {
    /// The class.
    pub class_id: ClassId,
    /// Effective capacity.
    pub capacity: i32,
    /// Enrolled registrations.
    pub enrolled: i64,
    /// Waitlisted registrations.
    pub waitlisted: i64,
    /// Free seats, never negative.
    pub seats_remaining: i64,
    /// Sessions in the class's group.
    pub session_count: usize,
    /// Whether the class accepts registrations.
    pub is_active: bool,
}

/// One registration of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// The registration.
    pub registration_id: RegistrationId,
    /// The class.
    pub class_id: ClassId,
    /// Class title.
    pub title: String,
    /// Start of the class's timeslot.
    pub starts_at: NaiveDateTime,
    /// Seat or queue.
    pub status: RegistrationStatus,
    /// Queue position when waitlisted.
    pub position: Option<i32>,
}
