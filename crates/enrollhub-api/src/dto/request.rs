//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use enrollhub_core::types::id::UserId;

/// Register a participant into a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Participant to register.
    pub participant_id: UserId,
}

/// Administrative assignment of a participant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignRequest {
    /// Participant to assign.
    pub participant_id: UserId,
    /// Evict same-date enrollments instead of reporting them.
    #[serde(default)]
    pub force: bool,
    /// Free-form reason recorded in the logs.
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}
