//! Waitlist Queue.
//!
//! Each class keeps a FIFO of waitlisted registrations numbered 1..N. The
//! numbering is compacted after every removal; entries with a missing,
//! non-positive, or duplicate position are reported as invariant
//! violations and never repaired by guessing.

use std::collections::HashSet;

use enrollhub_core::types::id::{ClassId, UserId};
use enrollhub_database::StoreTransaction;
use enrollhub_entity::registration::{NewRegistration, Registration};

use crate::capacity;
use crate::error::{EnrollmentError, EnrollmentResult};

/// Load the queue of a class ordered by position, checking every entry.
pub async fn queue(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<Vec<Registration>> {
    let entries = tx.waitlist(class_id).await?;
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        match entry.position {
            Some(p) if p > 0 => {
                if !seen.insert(p) {
                    return Err(EnrollmentError::invariant(format!(
                        "class {class_id} has duplicate waitlist position {p}"
                    )));
                }
            }
            other => {
                return Err(EnrollmentError::invariant(format!(
                    "waitlisted registration {} in class {class_id} has invalid position {other:?}",
                    entry.id
                )));
            }
        }
    }
    Ok(entries)
}

/// Append `user_id` to the queue of `class_id` at position count + 1.
pub async fn enqueue(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
    user_id: UserId,
) -> EnrollmentResult<Registration> {
    if tx.find_registration(user_id, class_id).await?.is_some() {
        return Err(EnrollmentError::AlreadyRegistered { user_id, class_id });
    }
    let count = capacity::waitlist_count(tx, class_id).await?;
    let position = i32::try_from(count + 1).map_err(|_| {
        EnrollmentError::invariant(format!("waitlist of class {class_id} overflowed"))
    })?;
    let registration = tx
        .insert_registration(NewRegistration::waitlisted(user_id, class_id, position))
        .await?;
    Ok(registration)
}

/// The lowest-position entry without changing it.
pub async fn head(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<Option<Registration>> {
    Ok(queue(tx, class_id).await?.into_iter().next())
}

/// Remove the head from the queue by enrolling it. The caller renumbers
/// and creates the attendance hook.
pub async fn promote_head(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<Option<Registration>> {
    let Some(head) = head(tx, class_id).await? else {
        return Ok(None);
    };
    tx.mark_enrolled(head.id).await?;
    let promoted = tx
        .find_registration_by_id(head.id)
        .await?
        .ok_or_else(|| {
            EnrollmentError::invariant(format!("promoted registration {} vanished", head.id))
        })?;
    Ok(Some(promoted))
}

/// Compact the queue of `class_id` to 1..N preserving order. Returns the
/// queue length.
pub async fn renumber(tx: &mut dyn StoreTransaction, class_id: ClassId) -> EnrollmentResult<usize> {
    let entries = queue(tx, class_id).await?;
    for (index, entry) in entries.iter().enumerate() {
        let expected = index as i32 + 1;
        if entry.position != Some(expected) {
            tx.set_position(entry.id, expected).await?;
        }
    }
    Ok(entries.len())
}
