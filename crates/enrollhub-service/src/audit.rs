//! Invariant auditor.
//!
//! Scans every class of an event inside one transaction and reports rows
//! that break the registration invariants. It never repairs anything.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use enrollhub_core::error::AppError;
use enrollhub_core::types::id::{ClassId, EventId, RegistrationId, UserId};
use enrollhub_database::{RegistrationStore, StoreTransaction};
use enrollhub_entity::class::ClassDetail;
use enrollhub_entity::registration::Registration;

use crate::error::EnrollmentResult;

/// A broken registration invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Capacity inputs produce a negative seat count.
    NegativeCapacity {
        /// Class.
        class_id: ClassId,
        /// Computed capacity.
        capacity: i32,
    },
    /// More enrolled registrations than seats.
    OverCapacity {
        /// Class.
        class_id: ClassId,
        /// Effective capacity.
        capacity: i32,
        /// Enrolled registrations.
        enrolled: i64,
    },
    /// An enrolled registration carries a queue position.
    EnrolledWithPosition {
        /// Class.
        class_id: ClassId,
        /// Registration.
        registration_id: RegistrationId,
    },
    /// A waitlisted registration has no position or a non-positive one.
    InvalidPosition {
        /// Class.
        class_id: ClassId,
        /// Registration.
        registration_id: RegistrationId,
        /// Stored position.
        position: Option<i32>,
    },
    /// Two waitlisted registrations share a position.
    DuplicatePosition {
        /// Class.
        class_id: ClassId,
        /// Shared position.
        position: i32,
    },
    /// Waitlist positions are not 1..N.
    WaitlistGap {
        /// Class.
        class_id: ClassId,
        /// Expected position at this rank.
        expected: i32,
        /// Position found instead.
        found: i32,
    },
    /// A participant holds seats in unrelated active classes on one day.
    SameDayDoubleEnrollment {
        /// Participant.
        user_id: UserId,
        /// Calendar date.
        date: NaiveDate,
        /// Classes holding the seats.
        class_ids: Vec<ClassId>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeCapacity { class_id, capacity } => {
                write!(f, "class {class_id} has negative capacity {capacity}")
            }
            Self::OverCapacity {
                class_id,
                capacity,
                enrolled,
            } => write!(f, "class {class_id} has {enrolled} enrolled, capacity {capacity}"),
            Self::EnrolledWithPosition {
                class_id,
                registration_id,
            } => write!(
                f,
                "enrolled registration {registration_id} in class {class_id} has a position"
            ),
            Self::InvalidPosition {
                class_id,
                registration_id,
                position,
            } => write!(
                f,
                "waitlisted registration {registration_id} in class {class_id} has position {position:?}"
            ),
            Self::DuplicatePosition { class_id, position } => {
                write!(f, "class {class_id} has duplicate waitlist position {position}")
            }
            Self::WaitlistGap {
                class_id,
                expected,
                found,
            } => write!(
                f,
                "class {class_id} waitlist expected position {expected}, found {found}"
            ),
            Self::SameDayDoubleEnrollment {
                user_id,
                date,
                class_ids,
            } => write!(
                f,
                "participant {user_id} enrolled in {} classes on {date}",
                class_ids.len()
            ),
        }
    }
}

/// Read-only consistency checker over a registration store.
#[derive(Debug, Clone)]
pub struct InvariantAuditor {
    store: Arc<dyn RegistrationStore>,
}

impl InvariantAuditor {
    /// Create an auditor.
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Report every violation among the classes of `event_id`.
    pub async fn audit_event(&self, event_id: EventId) -> EnrollmentResult<Vec<Violation>> {
        let mut tx = self.store.begin().await?;
        let result = audit_in(tx.as_mut(), event_id).await;
        tx.rollback().await?;
        let violations = result?;
        if violations.is_empty() {
            info!(event_id = %event_id, "Registration audit clean");
        } else {
            warn!(
                event_id = %event_id,
                violations = violations.len(),
                "Registration audit found violations"
            );
        }
        Ok(violations)
    }
}

async fn audit_in(
    tx: &mut dyn StoreTransaction,
    event_id: EventId,
) -> EnrollmentResult<Vec<Violation>> {
    if tx.find_event(event_id).await?.is_none() {
        return Err(AppError::not_found(format!("Event {event_id} not found")).into());
    }

    let mut violations = Vec::new();
    // (participant, date) -> (class, group key) of every active seat
    let mut seats: BTreeMap<(UserId, NaiveDate), Vec<(ClassId, Uuid)>> = BTreeMap::new();

    for class in tx.list_classes(event_id).await? {
        let registrations = tx.registrations_for_class(class.id()).await?;
        check_class(&class, &registrations, &mut violations);

        if class.class.is_active {
            let group_key = class
                .class
                .group_id
                .map_or(class.id().into_uuid(), |g| g.into_uuid());
            for reg in registrations.iter().filter(|r| r.is_enrolled()) {
                seats
                    .entry((reg.user_id, class.session_date()))
                    .or_default()
                    .push((class.id(), group_key));
            }
        }
    }

    for ((user_id, date), held) in seats {
        let groups: HashSet<Uuid> = held.iter().map(|(_, group)| *group).collect();
        if groups.len() > 1 {
            violations.push(Violation::SameDayDoubleEnrollment {
                user_id,
                date,
                class_ids: held.into_iter().map(|(class, _)| class).collect(),
            });
        }
    }
    Ok(violations)
}

fn check_class(class: &ClassDetail, registrations: &[Registration], out: &mut Vec<Violation>) {
    let class_id = class.id();
    let teacher_limit = class.class.teacher_max_students;
    let capacity = class
        .location_capacity
        .map_or(teacher_limit, |room| room.min(teacher_limit));
    if capacity < 0 {
        out.push(Violation::NegativeCapacity { class_id, capacity });
    }

    let enrolled = registrations.iter().filter(|r| r.is_enrolled()).count() as i64;
    if enrolled > i64::from(capacity.max(0)) {
        out.push(Violation::OverCapacity {
            class_id,
            capacity,
            enrolled,
        });
    }

    let mut positions = Vec::new();
    for reg in registrations {
        match (reg.is_enrolled(), reg.position) {
            (true, Some(_)) => out.push(Violation::EnrolledWithPosition {
                class_id,
                registration_id: reg.id,
            }),
            (true, None) => {}
            (false, Some(p)) if p > 0 => positions.push(p),
            (false, position) => out.push(Violation::InvalidPosition {
                class_id,
                registration_id: reg.id,
                position,
            }),
        }
    }

    positions.sort_unstable();
    let mut expected = 1;
    let mut previous = None;
    for position in positions {
        if previous == Some(position) {
            out.push(Violation::DuplicatePosition { class_id, position });
            continue;
        }
        if position != expected {
            out.push(Violation::WaitlistGap {
                class_id,
                expected,
                found: position,
            });
        }
        previous = Some(position);
        expected = position + 1;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use enrollhub_entity::registration::RegistrationStatus;

    use super::*;
    use crate::testing::Fixture;

    fn raw(user_id: UserId, class_id: ClassId, position: Option<i32>) -> Registration {
        Registration {
            id: RegistrationId::new(),
            user_id,
            class_id,
            status: if position.is_some() {
                RegistrationStatus::Waitlisted
            } else {
                RegistrationStatus::Enrolled
            },
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_reports_capacity_gap_and_duplicates() {
        let fx = Fixture::new().await;
        let class = fx.class(1).await;
        let users = [
            fx.student("A").await,
            fx.student("B").await,
            fx.student("C").await,
            fx.student("D").await,
        ];
        fx.store.insert_raw_registration(raw(users[0], class, None)).await;
        fx.store.insert_raw_registration(raw(users[1], class, None)).await;
        fx.store.insert_raw_registration(raw(users[2], class, Some(2))).await;
        fx.store.insert_raw_registration(raw(users[3], class, Some(2))).await;

        let auditor = InvariantAuditor::new(Arc::new(fx.store.clone()));
        let violations = auditor.audit_event(fx.event).await.unwrap();

        assert!(violations.contains(&Violation::OverCapacity {
            class_id: class,
            capacity: 1,
            enrolled: 2,
        }));
        assert!(violations.contains(&Violation::WaitlistGap {
            class_id: class,
            expected: 1,
            found: 2,
        }));
        assert!(violations.contains(&Violation::DuplicatePosition {
            class_id: class,
            position: 2,
        }));
    }

    #[tokio::test]
    async fn test_reports_same_day_double_enrollment() {
        let fx = Fixture::new().await;
        let morning = fx.class_at(3, 9, 5).await;
        let afternoon = fx.class_at(3, 14, 5).await;
        let z = fx.student("Z").await;
        fx.store.insert_raw_registration(raw(z, morning, None)).await;
        fx.store.insert_raw_registration(raw(z, afternoon, None)).await;

        let auditor = InvariantAuditor::new(Arc::new(fx.store.clone()));
        let violations = auditor.audit_event(fx.event).await.unwrap();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            Violation::SameDayDoubleEnrollment { user_id, class_ids, .. }
                if *user_id == z && class_ids.len() == 2
        ));
    }

    #[tokio::test]
    async fn test_unknown_event() {
        let fx = Fixture::new().await;
        let auditor = InvariantAuditor::new(Arc::new(fx.store.clone()));
        assert!(auditor.audit_event(EventId::new()).await.is_err());
    }
}
