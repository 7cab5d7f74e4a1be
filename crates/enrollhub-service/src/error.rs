//! Engine error taxonomy.

use thiserror::Error;
use tracing::error;

use enrollhub_core::error::{AppError, ErrorKind};
use enrollhub_core::types::id::{ClassId, UserId};

/// Result alias for engine operations.
pub type EnrollmentResult<T> = Result<T, EnrollmentError>;

/// Failures of admission engine operations.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// The class does not exist.
    #[error("Class {0} not found")]
    ClassNotFound(ClassId),

    /// The class, or a member of its session group, is inactive.
    #[error("Class {0} is not active")]
    ClassInactive(ClassId),

    /// The participant does not exist.
    #[error("Participant {0} not found")]
    ParticipantNotFound(UserId),

    /// The participant account is inactive.
    #[error("Participant {0} is not active")]
    ParticipantInactive(UserId),

    /// The participant already holds a registration in the session group.
    #[error("Participant {user_id} is already registered for class {class_id}")]
    AlreadyRegistered {
        /// Participant.
        user_id: UserId,
        /// Class that already holds the registration.
        class_id: ClassId,
    },

    /// The participant holds no registration for the class.
    #[error("Participant {user_id} has no registration for class {class_id}")]
    RegistrationNotFound {
        /// Participant.
        user_id: UserId,
        /// Requested class.
        class_id: ClassId,
    },

    /// The session group of the class resolved to no classes.
    #[error("Session group of class {0} is empty")]
    GroupEmpty(ClassId),

    /// Stored state contradicts an engine invariant.
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Contention persisted through every retry.
    #[error("Registration service busy, gave up after {attempts} attempts")]
    Unavailable {
        /// Attempts made.
        attempts: u32,
    },

    /// A store failure.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl EnrollmentError {
    /// Build an invariant violation, logging it with full context.
    pub fn invariant(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(violation = %message, "Registration invariant violated");
        Self::Invariant(message)
    }

    /// Whether re-running the operation in a fresh transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }

    /// The [`ErrorKind`] this error maps to at the service boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClassNotFound(_) | Self::ParticipantNotFound(_) => ErrorKind::NotFound,
            Self::RegistrationNotFound { .. } => ErrorKind::NotFound,
            Self::ClassInactive(_) | Self::ParticipantInactive(_) | Self::GroupEmpty(_) => {
                ErrorKind::Validation
            }
            Self::AlreadyRegistered { .. } => ErrorKind::Conflict,
            Self::Invariant(_) => ErrorKind::Internal,
            Self::Unavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::Store(e) => e.kind,
        }
    }
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::Store(inner) => inner,
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}
