//! Caller-side registration gates.
//!
//! The engine admits anyone into any active class. Whether the event's
//! registration window is open and whether the participant meets a class's
//! minimum level are decided here, by the calling layer, before the engine
//! is invoked. Administrative assignments bypass the gate.

use std::sync::Arc;

use thiserror::Error;

use enrollhub_core::error::{AppError, ErrorKind};
use enrollhub_core::types::id::{ClassId, EventId, UserId};
use enrollhub_database::RegistrationStore;
use enrollhub_entity::class::ClassDetail;
use enrollhub_entity::event::Event;
use enrollhub_entity::user::User;

/// What the participant is asking to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Join a class.
    Register,
    /// Leave a class.
    Drop,
}

/// Reasons a request is refused before reaching the engine.
#[derive(Debug, Error)]
pub enum GateError {
    /// The event's registration window is closed.
    #[error("Registration for event {0} is closed")]
    RegistrationClosed(EventId),

    /// The participant's level is below the class minimum.
    #[error("Class {class_id} requires level {required}, participant has level {actual}")]
    LevelTooLow {
        /// Class.
        class_id: ClassId,
        /// Minimum level.
        required: i32,
        /// Participant level.
        actual: i32,
    },

    /// The gate inputs could not be loaded.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Store(inner) => inner,
            other => AppError::new(ErrorKind::Validation, other.to_string()),
        }
    }
}

/// Evaluate the gates on loaded inputs.
pub fn evaluate(
    event: &Event,
    class: &ClassDetail,
    user: &User,
    action: GateAction,
) -> Result<(), GateError> {
    if !event.registration_open {
        return Err(GateError::RegistrationClosed(event.id));
    }
    if action == GateAction::Register {
        if let Some(required) = class.class.min_level {
            if user.level < required {
                return Err(GateError::LevelTooLow {
                    class_id: class.id(),
                    required,
                    actual: user.level,
                });
            }
        }
    }
    Ok(())
}

/// Loads gate inputs from the store and evaluates them.
#[derive(Debug, Clone)]
pub struct RegistrationGate {
    store: Arc<dyn RegistrationStore>,
}

impl RegistrationGate {
    /// Create a gate over a store.
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Check a participant request. Missing classes, events, or
    /// participants pass the gate so the engine can report them precisely.
    pub async fn check(
        &self,
        user_id: UserId,
        class_id: ClassId,
        action: GateAction,
    ) -> Result<(), GateError> {
        let mut tx = self.store.begin().await?;
        let Some(class) = tx.find_class(class_id).await? else {
            return Ok(());
        };
        let event = tx.find_event(class.event_id()).await?;
        let user = tx.find_user(user_id).await?;
        tx.rollback().await?;

        match (event, user) {
            (Some(event), Some(user)) => evaluate(&event, &class, &user, action),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use enrollhub_entity::class::Class;
    use enrollhub_entity::event::Timeslot;
    use enrollhub_entity::user::UserRole;

    use super::*;

    fn inputs(min_level: Option<i32>, open: bool) -> (Event, ClassDetail) {
        let mut event = Event::new("Camporee");
        event.registration_open = open;
        let start = NaiveDate::from_ymd_opt(2026, 7, 4)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap();
        let slot = Timeslot::new(event.id, start, start + chrono::Duration::hours(1));
        let mut class = Class::new(event.id, "Pioneering", slot.id, 10);
        class.min_level = min_level;
        let detail = ClassDetail {
            class,
            location_capacity: None,
            starts_at: slot.start_time,
        };
        (event, detail)
    }

    #[test]
    fn test_closed_window_blocks_register_and_drop() {
        let (event, class) = inputs(None, false);
        let user = User::new("Ada", UserRole::Student);
        for action in [GateAction::Register, GateAction::Drop] {
            assert!(matches!(
                evaluate(&event, &class, &user, action),
                Err(GateError::RegistrationClosed(_))
            ));
        }
    }

    #[test]
    fn test_min_level_applies_to_register_only() {
        let (event, class) = inputs(Some(3), true);
        let user = User::new("Ada", UserRole::Student).with_level(2);
        assert!(matches!(
            evaluate(&event, &class, &user, GateAction::Register),
            Err(GateError::LevelTooLow {
                required: 3,
                actual: 2,
                ..
            })
        ));
        assert!(evaluate(&event, &class, &user, GateAction::Drop).is_ok());

        let qualified = User::new("Grace", UserRole::Student).with_level(3);
        assert!(evaluate(&event, &class, &qualified, GateAction::Register).is_ok());
    }
}
