//! Register, drop, assignment, and read operations.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use enrollhub_core::config::EngineConfig;
use enrollhub_core::events::RegistrationEvent;
use enrollhub_core::types::id::{ClassId, UserId};
use enrollhub_database::{RegistrationStore, StoreTransaction};
use enrollhub_entity::class::ClassDetail;
use enrollhub_entity::registration::{NewRegistration, Registration, RegistrationStatus};
use enrollhub_entity::user::User;

use crate::capacity;
use crate::conflict::{self, Conflict};
use crate::error::{EnrollmentError, EnrollmentResult};
use crate::retry::RetryPolicy;
use crate::session_group;
use crate::waitlist;

use super::outcome::{
    AssignOutcome, ClassAvailability, ConflictInfo, DropOutcome, Promotion, RegisterOutcome,
    RosterEntry, ScheduleEntry, SessionOutcome,
};

/// How an admission treats a same-date enrollment held elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConflictPolicy {
    /// The blocked session is waitlisted.
    Waitlist,
    /// Stop and report the first conflict without writing anything.
    Report,
    /// Evict the conflicting enrollments with backfill, then admit.
    Evict,
}

/// The registration admission engine.
#[derive(Debug, Clone)]
pub struct AdmissionEngine {
    store: Arc<dyn RegistrationStore>,
    retry: RetryPolicy,
    pub(super) max_promotion_depth: u32,
}

impl AdmissionEngine {
    /// Create an engine over a registration store.
    pub fn new(store: Arc<dyn RegistrationStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            retry: RetryPolicy::from_config(&config.retry),
            max_promotion_depth: config.max_promotion_depth,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn RegistrationStore> {
        &self.store
    }

    /// Register a participant into a class and every sibling session.
    pub async fn register(
        &self,
        user_id: UserId,
        class_id: ClassId,
    ) -> EnrollmentResult<RegisterOutcome> {
        let outcome = self
            .retrying("register", || {
                self.admit_once(user_id, class_id, ConflictPolicy::Waitlist)
            })
            .await?;
        match outcome {
            AssignOutcome::Registered(outcome) => Ok(outcome),
            AssignOutcome::ConflictDetected(info) => Err(EnrollmentError::invariant(format!(
                "registration of {user_id} into {class_id} reported conflict with {}",
                info.conflicting_registration_id
            ))),
        }
    }

    /// Register on behalf of an administrator. A same-date enrollment is
    /// reported as [`AssignOutcome::ConflictDetected`] instead of
    /// waitlisting, and nothing is written.
    pub async fn admin_assign(
        &self,
        user_id: UserId,
        class_id: ClassId,
    ) -> EnrollmentResult<AssignOutcome> {
        self.retrying("admin_assign", || {
            self.admit_once(user_id, class_id, ConflictPolicy::Report)
        })
        .await
    }

    /// Evict every conflicting enrollment (backfilling the freed seats) and
    /// register, in one transaction.
    pub async fn force_assign(
        &self,
        user_id: UserId,
        class_id: ClassId,
    ) -> EnrollmentResult<RegisterOutcome> {
        let outcome = self
            .retrying("force_assign", || {
                self.admit_once(user_id, class_id, ConflictPolicy::Evict)
            })
            .await?;
        match outcome {
            AssignOutcome::Registered(outcome) => Ok(outcome),
            AssignOutcome::ConflictDetected(info) => Err(EnrollmentError::invariant(format!(
                "forced assignment of {user_id} into {class_id} left conflict with {}",
                info.conflicting_registration_id
            ))),
        }
    }

    /// Remove a participant from a class and every sibling session.
    pub async fn drop(&self, user_id: UserId, class_id: ClassId) -> EnrollmentResult<DropOutcome> {
        self.retrying("drop", || self.drop_once(user_id, class_id))
            .await
    }

    /// Enrolled registrations by creation time, then the waitlist by
    /// position.
    pub async fn roster(&self, class_id: ClassId) -> EnrollmentResult<Vec<RosterEntry>> {
        self.retrying("roster", || self.roster_once(class_id)).await
    }

    /// Seat counts of a class.
    pub async fn availability(&self, class_id: ClassId) -> EnrollmentResult<ClassAvailability> {
        self.retrying("availability", || self.availability_once(class_id))
            .await
    }

    /// Every registration of a participant, in timeslot order.
    pub async fn schedule(&self, user_id: UserId) -> EnrollmentResult<Vec<ScheduleEntry>> {
        self.retrying("schedule", || self.schedule_once(user_id))
            .await
    }

    /// Sessions of the group `class_id` belongs to.
    pub async fn group_of(&self, class_id: ClassId) -> EnrollmentResult<Vec<ClassDetail>> {
        self.retrying("group_of", || self.group_once(class_id)).await
    }

    /// Number of sessions in the group of `class_id`.
    pub async fn session_count(&self, class_id: ClassId) -> EnrollmentResult<usize> {
        Ok(self.group_of(class_id).await?.len())
    }

    /// Whether `class_id` is part of a multi-session group.
    pub async fn is_multi_session(&self, class_id: ClassId) -> EnrollmentResult<bool> {
        Ok(self.session_count(class_id).await? > 1)
    }

    /// Re-run `attempt` while it fails with contention, with backoff.
    async fn retrying<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> EnrollmentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EnrollmentResult<T>>,
    {
        let mut failures: u32 = 0;
        loop {
            match attempt().await {
                Ok(value) => {
                    if failures > 0 {
                        info!(operation, attempts = failures + 1, "Succeeded after contention");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => {
                    failures += 1;
                    if !self.retry.should_retry(failures) {
                        warn!(
                            operation,
                            attempts = failures,
                            error = %err,
                            "Contention retries exhausted"
                        );
                        return Err(EnrollmentError::Unavailable { attempts: failures });
                    }
                    let delay = self.retry.delay_for_attempt(failures - 1);
                    warn!(
                        operation,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Contention, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn admit_once(
        &self,
        user_id: UserId,
        class_id: ClassId,
        policy: ConflictPolicy,
    ) -> EnrollmentResult<AssignOutcome> {
        let mut tx = self.store.begin().await?;
        let result = self.admit(tx.as_mut(), user_id, class_id, policy).await;
        match result {
            Ok(AssignOutcome::ConflictDetected(info)) => {
                tx.rollback().await?;
                Ok(AssignOutcome::ConflictDetected(info))
            }
            other => {
                let result = finish(tx, other).await;
                if let Ok(AssignOutcome::Registered(outcome)) = &result {
                    log_events(&outcome.events);
                }
                result
            }
        }
    }

    async fn admit(
        &self,
        tx: &mut dyn StoreTransaction,
        user_id: UserId,
        class_id: ClassId,
        policy: ConflictPolicy,
    ) -> EnrollmentResult<AssignOutcome> {
        let class = tx
            .find_class(class_id)
            .await?
            .ok_or(EnrollmentError::ClassNotFound(class_id))?;
        if !class.class.is_active {
            return Err(EnrollmentError::ClassInactive(class_id));
        }
        let user = load_active_user(tx, user_id).await?;

        let group = session_group::resolve(tx, &class).await?;
        if let Some(inactive) = group.iter().find(|c| !c.class.is_active) {
            return Err(EnrollmentError::ClassInactive(inactive.id()));
        }
        let group_ids: Vec<ClassId> = group.iter().map(ClassDetail::id).collect();

        tx.lock_classes(&group_ids).await?;
        tx.lock_participant(user_id).await?;

        for member in &group_ids {
            if tx.find_registration(user_id, *member).await?.is_some() {
                return Err(EnrollmentError::AlreadyRegistered {
                    user_id,
                    class_id: *member,
                });
            }
        }

        let mut events = Vec::new();
        match policy {
            ConflictPolicy::Waitlist => {}
            ConflictPolicy::Report => {
                for session in &group {
                    if let Some(found) =
                        conflict::find_conflict_for(tx, user_id, session, &group_ids).await?
                    {
                        info!(
                            participant_id = %user_id,
                            class_id = %session.id(),
                            conflicting_class_id = %found.class.id(),
                            "Assignment blocked by same-day enrollment"
                        );
                        return Ok(AssignOutcome::ConflictDetected(ConflictInfo {
                            session_class_id: session.id(),
                            conflicting_class_id: found.class.id(),
                            conflicting_registration_id: found.registration.id,
                        }));
                    }
                }
            }
            ConflictPolicy::Evict => {
                for session in &group {
                    while let Some(found) =
                        conflict::find_conflict_for(tx, user_id, session, &group_ids).await?
                    {
                        let backfill = found.class.id();
                        tx.lock_classes(&[backfill]).await?;
                        self.evict(tx, &found, session.id(), &mut events).await?;
                        self.promote(tx, backfill, 0, &mut events).await?;
                    }
                }
            }
        }

        let mut placements = Vec::with_capacity(group.len());
        for session in &group {
            let space = capacity::has_space(tx, session).await?;
            let blocked = conflict::has_conflict(
                tx,
                user_id,
                session.event_id(),
                session.session_date(),
                &group_ids,
            )
            .await?;
            placements.push(space && !blocked);
        }
        let all_admissible = placements.iter().all(|admissible| *admissible);

        let priority = user.priority();
        let mut registrations = Vec::with_capacity(group.len());
        for (session, admissible) in group.iter().zip(placements) {
            let enroll = all_admissible || (priority.is_priority() && admissible);
            let registration = if enroll {
                let reg = tx
                    .insert_registration(NewRegistration::enrolled(user_id, session.id()))
                    .await?;
                tx.create_attendance(reg.id).await?;
                events.push(RegistrationEvent::Enrolled {
                    registration_id: reg.id,
                    user_id,
                    class_id: session.id(),
                });
                reg
            } else {
                let reg = waitlist::enqueue(tx, session.id(), user_id).await?;
                events.push(RegistrationEvent::Waitlisted {
                    registration_id: reg.id,
                    user_id,
                    class_id: session.id(),
                    position: reg.position.unwrap_or_default(),
                });
                reg
            };
            registrations.push(registration);
        }

        let outcome = summarize(class_id, &registrations, events);
        info!(
            participant_id = %user_id,
            class_id = %class_id,
            status = %outcome.status,
            position = ?outcome.position,
            sessions = outcome.sessions_affected,
            "Registration placed"
        );
        Ok(AssignOutcome::Registered(outcome))
    }

    async fn drop_once(&self, user_id: UserId, class_id: ClassId) -> EnrollmentResult<DropOutcome> {
        let mut tx = self.store.begin().await?;
        let result = self.drop_in(tx.as_mut(), user_id, class_id).await;
        let result = finish(tx, result).await;
        if let Ok(outcome) = &result {
            log_events(&outcome.events);
        }
        result
    }

    async fn drop_in(
        &self,
        tx: &mut dyn StoreTransaction,
        user_id: UserId,
        class_id: ClassId,
    ) -> EnrollmentResult<DropOutcome> {
        let not_found = EnrollmentError::RegistrationNotFound { user_id, class_id };
        let Some(class) = tx.find_class(class_id).await? else {
            return Err(not_found);
        };
        let group = session_group::resolve(tx, &class).await?;
        let group_ids: Vec<ClassId> = group.iter().map(ClassDetail::id).collect();

        tx.lock_classes(&group_ids).await?;
        tx.lock_participant(user_id).await?;

        if tx.find_registration(user_id, class_id).await?.is_none() {
            return Err(not_found);
        }

        let mut events = Vec::new();
        let mut removed = 0;
        let mut promote_requested = false;
        for member in &group_ids {
            let Some(reg) = tx.find_registration(user_id, *member).await? else {
                continue;
            };
            tx.delete_attendance(reg.id).await?;
            if !tx.delete_registration(reg.id).await? {
                return Err(EnrollmentError::invariant(format!(
                    "registration {} disappeared during drop",
                    reg.id
                )));
            }
            removed += 1;
            events.push(RegistrationEvent::Dropped {
                registration_id: reg.id,
                user_id,
                class_id: *member,
                was_enrolled: reg.is_enrolled(),
            });
            if reg.is_waitlisted() {
                waitlist::renumber(tx, *member).await?;
            } else if *member == class_id {
                promote_requested = true;
            } else {
                debug!(
                    class_id = %member,
                    "Seat freed in sibling session, not promoting"
                );
            }
        }

        if promote_requested {
            self.promote(tx, class_id, 0, &mut events).await?;
        }

        let promotions = events
            .iter()
            .filter_map(|event| match event {
                RegistrationEvent::Promoted {
                    registration_id,
                    user_id,
                    class_id,
                } => Some(Promotion {
                    registration_id: *registration_id,
                    user_id: *user_id,
                    class_id: *class_id,
                }),
                _ => None,
            })
            .collect();

        info!(
            participant_id = %user_id,
            class_id = %class_id,
            sessions = removed,
            "Registration dropped"
        );
        Ok(DropOutcome {
            sessions_affected: removed,
            promotions,
            events,
        })
    }

    /// Delete a conflicting enrollment and its attendance hook.
    pub(super) async fn evict(
        &self,
        tx: &mut dyn StoreTransaction,
        found: &Conflict,
        promoted_into: ClassId,
        events: &mut Vec<RegistrationEvent>,
    ) -> EnrollmentResult<()> {
        let reg = &found.registration;
        tx.delete_attendance(reg.id).await?;
        if !tx.delete_registration(reg.id).await? {
            return Err(EnrollmentError::invariant(format!(
                "conflicting registration {} disappeared before eviction",
                reg.id
            )));
        }
        warn!(
            participant_id = %reg.user_id,
            evicted_from = %reg.class_id,
            promoted_into = %promoted_into,
            "Evicted same-day enrollment"
        );
        events.push(RegistrationEvent::Evicted {
            registration_id: reg.id,
            user_id: reg.user_id,
            class_id: reg.class_id,
            promoted_into,
        });
        Ok(())
    }

    async fn roster_once(&self, class_id: ClassId) -> EnrollmentResult<Vec<RosterEntry>> {
        let mut tx = self.store.begin().await?;
        let result = roster_in(tx.as_mut(), class_id).await;
        finish(tx, result).await
    }

    async fn availability_once(&self, class_id: ClassId) -> EnrollmentResult<ClassAvailability> {
        let mut tx = self.store.begin().await?;
        let result = availability_in(tx.as_mut(), class_id).await;
        finish(tx, result).await
    }

    async fn schedule_once(&self, user_id: UserId) -> EnrollmentResult<Vec<ScheduleEntry>> {
        let mut tx = self.store.begin().await?;
        let result = schedule_in(tx.as_mut(), user_id).await;
        finish(tx, result).await
    }

    async fn group_once(&self, class_id: ClassId) -> EnrollmentResult<Vec<ClassDetail>> {
        let mut tx = self.store.begin().await?;
        let result = session_group::group_of(tx.as_mut(), class_id).await;
        finish(tx, result).await
    }
}

/// Commit on success, roll back on failure.
async fn finish<T>(
    tx: Box<dyn StoreTransaction>,
    result: EnrollmentResult<T>,
) -> EnrollmentResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}

fn log_events(events: &[RegistrationEvent]) {
    for event in events {
        info!(
            event = event.name(),
            participant_id = %event.user_id(),
            class_id = %event.class_id(),
            "Registration event"
        );
    }
}

async fn load_active_user(tx: &mut dyn StoreTransaction, user_id: UserId) -> EnrollmentResult<User> {
    let user = tx
        .find_user(user_id)
        .await?
        .ok_or(EnrollmentError::ParticipantNotFound(user_id))?;
    if !user.is_active() {
        return Err(EnrollmentError::ParticipantInactive(user_id));
    }
    Ok(user)
}

fn summarize(
    requested: ClassId,
    registrations: &[Registration],
    events: Vec<RegistrationEvent>,
) -> RegisterOutcome {
    let status = if registrations.iter().all(Registration::is_enrolled) {
        RegistrationStatus::Enrolled
    } else {
        RegistrationStatus::Waitlisted
    };
    let position = registrations
        .iter()
        .find(|r| r.class_id == requested && r.is_waitlisted())
        .or_else(|| registrations.iter().find(|r| r.is_waitlisted()))
        .and_then(|r| r.position);
    RegisterOutcome {
        status,
        position,
        sessions_affected: registrations.len(),
        sessions: registrations.iter().map(SessionOutcome::from).collect(),
        events,
    }
}

async fn roster_in(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<Vec<RosterEntry>> {
    if tx.find_class(class_id).await?.is_none() {
        return Err(EnrollmentError::ClassNotFound(class_id));
    }
    let registrations = tx.registrations_for_class(class_id).await?;
    Ok(registrations.into_iter().map(RosterEntry::from).collect())
}

async fn availability_in(
    tx: &mut dyn StoreTransaction,
    class_id: ClassId,
) -> EnrollmentResult<ClassAvailability> {
    let class = tx
        .find_class(class_id)
        .await?
        .ok_or(EnrollmentError::ClassNotFound(class_id))?;
    let capacity = capacity::effective_capacity(&class)?;
    let enrolled = capacity::enrolled_count(tx, class_id).await?;
    let waitlisted = capacity::waitlist_count(tx, class_id).await?;
    let group = session_group::resolve(tx, &class).await?;
    Ok(ClassAvailability {
        class_id,
        capacity,
        enrolled,
        waitlisted,
        seats_remaining: (i64::from(capacity) - enrolled).max(0),
        session_count: group.len(),
        is_active: class.class.is_active,
    })
}

async fn schedule_in(
    tx: &mut dyn StoreTransaction,
    user_id: UserId,
) -> EnrollmentResult<Vec<ScheduleEntry>> {
    if tx.find_user(user_id).await?.is_none() {
        return Err(EnrollmentError::ParticipantNotFound(user_id));
    }
    let mut entries = Vec::new();
    for reg in tx.registrations_for_user(user_id).await? {
        let class = tx.find_class(reg.class_id).await?.ok_or_else(|| {
            EnrollmentError::invariant(format!(
                "registration {} references missing class {}",
                reg.id, reg.class_id
            ))
        })?;
        entries.push(ScheduleEntry {
            registration_id: reg.id,
            class_id: reg.class_id,
            title: class.class.title,
            starts_at: class.starts_at,
            status: reg.status,
            position: reg.position,
        });
    }
    entries.sort_by_key(|e| e.starts_at);
    Ok(entries)
}
