//! Conflict Detector.
//!
//! Two enrollments conflict when they belong to the same participant and
//! event, both classes are active, and both timeslots start on the same
//! calendar date.

use chrono::NaiveDate;

use enrollhub_core::types::id::{ClassId, EventId, UserId};
use enrollhub_database::StoreTransaction;
use enrollhub_entity::class::ClassDetail;
use enrollhub_entity::registration::Registration;

use crate::error::EnrollmentResult;

/// An enrolled registration occupying the participant's date.
#[derive(Debug, Clone)]
pub struct Conflict {
    /// The conflicting registration.
    pub registration: Registration,
    /// Its class.
    pub class: ClassDetail,
}

/// Find the enrollment that blocks `user_id` on `date`, ignoring the
/// classes in `excluded`.
pub async fn find_conflict(
    tx: &mut dyn StoreTransaction,
    user_id: UserId,
    event_id: EventId,
    date: NaiveDate,
    excluded: &[ClassId],
) -> EnrollmentResult<Option<Conflict>> {
    let hit = tx
        .find_enrolled_on_date(user_id, event_id, date, excluded)
        .await?;
    Ok(hit.map(|(registration, class)| Conflict {
        registration,
        class,
    }))
}

/// Whether any enrollment blocks `user_id` on `date`.
pub async fn has_conflict(
    tx: &mut dyn StoreTransaction,
    user_id: UserId,
    event_id: EventId,
    date: NaiveDate,
    excluded: &[ClassId],
) -> EnrollmentResult<bool> {
    Ok(find_conflict(tx, user_id, event_id, date, excluded)
        .await?
        .is_some())
}

/// [`find_conflict`] for the date of `class`.
pub async fn find_conflict_for(
    tx: &mut dyn StoreTransaction,
    user_id: UserId,
    class: &ClassDetail,
    excluded: &[ClassId],
) -> EnrollmentResult<Option<Conflict>> {
    find_conflict(tx, user_id, class.event_id(), class.session_date(), excluded).await
}

#[cfg(test)]
mod tests {
    use enrollhub_database::RegistrationStore;
    use enrollhub_entity::registration::NewRegistration;

    use super::*;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn test_same_date_enrollment_conflicts() {
        let fx = Fixture::new().await;
        let morning = fx.class_at(1, 9, 5).await;
        let afternoon = fx.class_at(1, 14, 5).await;
        let next_day = fx.class_at(2, 9, 5).await;
        let z = fx.student("Z").await;

        let mut tx = fx.store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::enrolled(z, morning))
            .await
            .unwrap();

        let pm = tx.find_class(afternoon).await.unwrap().unwrap();
        let hit = find_conflict_for(tx.as_mut(), z, &pm, &[]).await.unwrap();
        assert_eq!(hit.map(|c| c.class.id()), Some(morning));

        let tomorrow = tx.find_class(next_day).await.unwrap().unwrap();
        assert!(
            find_conflict_for(tx.as_mut(), z, &tomorrow, &[])
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_waitlisted_registration_does_not_conflict() {
        let fx = Fixture::new().await;
        let morning = fx.class_at(1, 9, 5).await;
        let afternoon = fx.class_at(1, 14, 5).await;
        let z = fx.student("Z").await;

        let mut tx = fx.store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::waitlisted(z, morning, 1))
            .await
            .unwrap();
        let pm = tx.find_class(afternoon).await.unwrap().unwrap();
        assert!(
            !has_conflict(tx.as_mut(), z, pm.event_id(), pm.session_date(), &[])
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_group_exclusion_ignores_same_day_sibling() {
        let fx = Fixture::new().await;
        let sessions = fx.group_on_day(&[(9, 1), (14, 2)]).await;
        let z = fx.student("Z").await;

        let mut tx = fx.store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::enrolled(z, sessions[1]))
            .await
            .unwrap();
        let first = tx.find_class(sessions[0]).await.unwrap().unwrap();

        let hit = find_conflict_for(tx.as_mut(), z, &first, &[sessions[0]])
            .await
            .unwrap();
        assert_eq!(hit.map(|c| c.class.id()), Some(sessions[1]));
        assert!(
            find_conflict_for(tx.as_mut(), z, &first, &sessions)
                .await
                .unwrap()
                .is_none()
        );
    }
}
