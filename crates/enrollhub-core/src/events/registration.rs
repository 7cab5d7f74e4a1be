//! Registration lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::id::{ClassId, RegistrationId, UserId};

/// Events related to a participant's registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrationEvent {
    /// A participant took a seat directly at registration time.
    Enrolled {
        /// The registration row.
        registration_id: RegistrationId,
        /// The participant.
        user_id: UserId,
        /// The class.
        class_id: ClassId,
    },
    /// A participant was queued for a full (or conflicting) class.
    Waitlisted {
        /// The registration row.
        registration_id: RegistrationId,
        /// The participant.
        user_id: UserId,
        /// The class.
        class_id: ClassId,
        /// Queue position at the time of insertion.
        position: i32,
    },
    /// A registration was removed at the participant's (or caller's) request.
    Dropped {
        /// The registration row that no longer exists.
        registration_id: RegistrationId,
        /// The participant.
        user_id: UserId,
        /// The class.
        class_id: ClassId,
        /// Whether the dropped row held a seat.
        was_enrolled: bool,
    },
    /// The head of a waitlist moved into a freed seat.
    Promoted {
        /// The registration row.
        registration_id: RegistrationId,
        /// The participant.
        user_id: UserId,
        /// The class.
        class_id: ClassId,
    },
    /// An enrolled registration was removed to resolve a same-date conflict
    /// for a participant being promoted elsewhere.
    Evicted {
        /// The registration row that no longer exists.
        registration_id: RegistrationId,
        /// The participant who lost the seat.
        user_id: UserId,
        /// The class the seat belonged to.
        class_id: ClassId,
        /// The class the participant is being promoted into.
        promoted_into: ClassId,
    },
}

impl RegistrationEvent {
    /// The class the event happened in.
    pub fn class_id(&self) -> ClassId {
        match self {
            Self::Enrolled { class_id, .. }
            | Self::Waitlisted { class_id, .. }
            | Self::Dropped { class_id, .. }
            | Self::Promoted { class_id, .. }
            | Self::Evicted { class_id, .. } => *class_id,
        }
    }

    /// The participant the event is about.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Enrolled { user_id, .. }
            | Self::Waitlisted { user_id, .. }
            | Self::Dropped { user_id, .. }
            | Self::Promoted { user_id, .. }
            | Self::Evicted { user_id, .. } => *user_id,
        }
    }

    /// Short machine-readable name, used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enrolled { .. } => "enrolled",
            Self::Waitlisted { .. } => "waitlisted",
            Self::Dropped { .. } => "dropped",
            Self::Promoted { .. } => "promoted",
            Self::Evicted { .. } => "evicted",
        }
    }
}
