//! Waitlist promotion with eviction and backfill.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info};

use enrollhub_core::events::RegistrationEvent;
use enrollhub_core::types::id::ClassId;
use enrollhub_database::StoreTransaction;
use enrollhub_entity::class::ClassDetail;

use crate::capacity;
use crate::conflict;
use crate::error::{EnrollmentError, EnrollmentResult};
use crate::session_group;
use crate::waitlist;

use super::engine::AdmissionEngine;

impl AdmissionEngine {
    /// Fill free seats of `class_id` from its waitlist.
    ///
    /// A head entry whose participant is enrolled outside the class's own
    /// group on the same date has that enrollment evicted first; the vacated class is promoted
    /// recursively before the loop re-evaluates. Each pass either converts
    /// a waitlisted registration or deletes an enrolled one, so the loop
    /// terminates. Nesting deeper than `max_promotion_depth` is an
    /// invariant violation.
    pub(super) fn promote<'a>(
        &'a self,
        tx: &'a mut dyn StoreTransaction,
        class_id: ClassId,
        depth: u32,
        events: &'a mut Vec<RegistrationEvent>,
    ) -> BoxFuture<'a, EnrollmentResult<()>> {
        async move {
            if depth > self.max_promotion_depth {
                return Err(EnrollmentError::invariant(format!(
                    "promotion cascade from class {class_id} exceeded depth {}",
                    self.max_promotion_depth
                )));
            }

            let class = tx
                .find_class(class_id)
                .await?
                .ok_or(EnrollmentError::ClassNotFound(class_id))?;
            if !class.class.is_active {
                debug!(class_id = %class_id, "Class inactive, skipping promotion");
                return Ok(());
            }
            let capacity = capacity::effective_capacity(&class)?;
            let group_ids: Vec<ClassId> = session_group::resolve(tx, &class)
                .await?
                .iter()
                .map(ClassDetail::id)
                .collect();

            loop {
                let enrolled = capacity::enrolled_count(tx, class_id).await?;
                if enrolled >= i64::from(capacity) {
                    break;
                }
                let Some(head) = waitlist::head(tx, class_id).await? else {
                    break;
                };

                match conflict::find_conflict_for(tx, head.user_id, &class, &group_ids).await? {
                    None => {
                        let promoted = waitlist::promote_head(tx, class_id).await?;
                        let promoted = match promoted {
                            Some(reg) if reg.id == head.id => reg,
                            _ => {
                                return Err(EnrollmentError::invariant(format!(
                                    "waitlist head of class {class_id} changed during promotion"
                                )));
                            }
                        };
                        tx.create_attendance(promoted.id).await?;
                        waitlist::renumber(tx, class_id).await?;
                        info!(
                            participant_id = %promoted.user_id,
                            class_id = %class_id,
                            depth,
                            "Promoted from waitlist"
                        );
                        events.push(RegistrationEvent::Promoted {
                            registration_id: promoted.id,
                            user_id: promoted.user_id,
                            class_id,
                        });
                    }
                    Some(found) => {
                        let vacated = found.class.id();
                        tx.lock_classes(&[vacated]).await?;
                        self.evict(tx, &found, class_id, events).await?;
                        self.promote(tx, vacated, depth + 1, events).await?;
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }
}
