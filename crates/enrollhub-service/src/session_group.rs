//! Session Group Resolver.
//!
//! Classes sharing a `group_id` inside one event form a multi-session
//! group. A class without a group is its own singleton group.

use enrollhub_core::types::id::ClassId;
use enrollhub_database::StoreTransaction;
use enrollhub_entity::class::ClassDetail;

use crate::error::{EnrollmentError, EnrollmentResult};

/// Resolve the group of an already loaded class, ordered by session
/// number.
pub async fn resolve(
    tx: &mut dyn StoreTransaction,
    class: &ClassDetail,
) -> EnrollmentResult<Vec<ClassDetail>> {
    let Some(group_id) = class.class.group_id else {
        return Ok(vec![class.clone()]);
    };
    let members = tx.find_group(class.event_id(), group_id).await?;
    if members.is_empty() {
        return Err(EnrollmentError::GroupEmpty(class.id()));
    }
    Ok(members)
}

/// All sessions of the group `class_id` belongs to.
pub async fn group_of(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<Vec<ClassDetail>> {
    let class = tx
        .find_class(class_id)
        .await?
        .ok_or(EnrollmentError::ClassNotFound(class_id))?;
    resolve(tx, &class).await
}

/// Number of sessions in the group of `class_id`.
pub async fn session_count(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<usize> {
    Ok(group_of(tx, class_id).await?.len())
}

/// Whether `class_id` belongs to a group of more than one session.
pub async fn is_multi_session(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<bool> {
    Ok(session_count(tx, class_id).await? > 1)
}
