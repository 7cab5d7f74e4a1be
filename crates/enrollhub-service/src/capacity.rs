//! Capacity Resolver.
//!
//! The effective capacity of a class is recomputed on every read from the
//! instructor limit and the room size. It is never stored.

use enrollhub_core::types::id::ClassId;
use enrollhub_database::StoreTransaction;
use enrollhub_entity::class::ClassDetail;
use enrollhub_entity::registration::RegistrationStatus;

use crate::error::{EnrollmentError, EnrollmentResult};

/// `min(room, instructor limit)` when a room is assigned, otherwise the
/// instructor limit.
pub fn effective_capacity(class: &ClassDetail) -> EnrollmentResult<i32> {
    let teacher_limit = class.class.teacher_max_students;
    let capacity = match class.location_capacity {
        Some(room) => room.min(teacher_limit),
        None => teacher_limit,
    };
    if capacity < 0 {
        return Err(EnrollmentError::invariant(format!(
            "class {} has negative effective capacity {capacity}",
            class.id()
        )));
    }
    Ok(capacity)
}

/// Live number of enrolled registrations.
pub async fn enrolled_count(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<i64> {
    Ok(tx
        .count_registrations(class_id, RegistrationStatus::Enrolled)
        .await?)
}

/// Live number of waitlisted registrations.
pub async fn waitlist_count(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<i64> {
    Ok(tx
        .count_registrations(class_id, RegistrationStatus::Waitlisted)
        .await?)
}

/// Whether one more participant can be enrolled.
pub async fn has_space(tx: &mut dyn StoreTransaction, class: &ClassDetail) -> EnrollmentResult<bool> {
    let capacity = effective_capacity(class)?;
    let enrolled = enrolled_count(tx, class.id()).await?;
    Ok(enrolled < i64::from(capacity))
}

#[cfg(test)]
mod tests {
    use enrollhub_database::RegistrationStore;
    use enrollhub_entity::registration::NewRegistration;

    use super::*;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn test_room_limits_capacity() {
        let fx = Fixture::new().await;
        let class = fx.class_in_room(30, 12).await;
        let mut tx = fx.store.begin().await.unwrap();
        let detail = tx.find_class(class).await.unwrap().unwrap();
        assert_eq!(effective_capacity(&detail).unwrap(), 12);
    }

    #[tokio::test]
    async fn test_instructor_limit_without_room() {
        let fx = Fixture::new().await;
        let class = fx.class(8).await;
        let mut tx = fx.store.begin().await.unwrap();
        let detail = tx.find_class(class).await.unwrap().unwrap();
        assert_eq!(effective_capacity(&detail).unwrap(), 8);
    }

    #[tokio::test]
    async fn test_negative_capacity_is_invariant_violation() {
        let fx = Fixture::new().await;
        let class = fx.class(-1).await;
        let mut tx = fx.store.begin().await.unwrap();
        let detail = tx.find_class(class).await.unwrap().unwrap();
        assert!(matches!(
            effective_capacity(&detail),
            Err(EnrollmentError::Invariant(_))
        ));
    }

    #[tokio::test]
    async fn test_has_space_counts_only_enrolled() {
        let fx = Fixture::new().await;
        let class = fx.class(1).await;
        let (a, b) = (fx.student("A").await, fx.student("B").await);

        let mut tx = fx.store.begin().await.unwrap();
        let detail = tx.find_class(class).await.unwrap().unwrap();
        tx.insert_registration(NewRegistration::waitlisted(b, class, 1))
            .await
            .unwrap();
        assert!(has_space(tx.as_mut(), &detail).await.unwrap());

        tx.insert_registration(NewRegistration::enrolled(a, class))
            .await
            .unwrap();
        assert!(!has_space(tx.as_mut(), &detail).await.unwrap());
        assert_eq!(waitlist_count(tx.as_mut(), class).await.unwrap(), 1);
    }
}
