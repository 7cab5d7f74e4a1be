//! In-memory registration store.
//!
//! Transactions hold the store mutex from `begin` until they finish and
//! work on a private copy of the state, so they are strictly serialized and
//! a dropped transaction leaves no trace. Commit enforces the same row
//! constraints the PostgreSQL schema declares.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use enrollhub_core::error::AppError;
use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::{
    ClassId, EventId, GroupId, LocationId, RegistrationId, TimeslotId, UserId,
};
use enrollhub_entity::class::{Class, ClassDetail};
use enrollhub_entity::event::{Event, Location, Timeslot};
use enrollhub_entity::registration::{NewRegistration, Registration, RegistrationStatus};
use enrollhub_entity::user::User;

use super::{RegistrationStore, StoreTransaction};

/// Tables held by the in-memory store.
#[derive(Debug, Default, Clone)]
struct MemoryState {
    events: HashMap<EventId, Event>,
    timeslots: HashMap<TimeslotId, Timeslot>,
    locations: HashMap<LocationId, Location>,
    classes: HashMap<ClassId, Class>,
    users: HashMap<UserId, User>,
    registrations: HashMap<RegistrationId, Registration>,
    attendance: HashSet<RegistrationId>,
}

impl MemoryState {
    fn detail(&self, class: &Class) -> Option<ClassDetail> {
        let timeslot = self.timeslots.get(&class.timeslot_id)?;
        let location_capacity = class
            .location_id
            .and_then(|id| self.locations.get(&id))
            .map(|l| l.max_capacity);
        Some(ClassDetail {
            class: class.clone(),
            location_capacity,
            starts_at: timeslot.start_time,
        })
    }

    fn detail_by_id(&self, id: ClassId) -> Option<ClassDetail> {
        self.classes.get(&id).and_then(|c| self.detail(c))
    }

    /// Row checks mirroring the table constraints on `registrations`.
    fn validate(&self) -> AppResult<()> {
        let mut seen_pairs = HashSet::new();
        let mut seen_positions = HashSet::new();
        for reg in self.registrations.values() {
            if !seen_pairs.insert((reg.user_id, reg.class_id)) {
                return Err(AppError::conflict(format!(
                    "Duplicate registration of user {} for class {}",
                    reg.user_id, reg.class_id
                )));
            }
            match (reg.status, reg.position) {
                (RegistrationStatus::Waitlisted, Some(p)) if p > 0 => {
                    if !seen_positions.insert((reg.class_id, p)) {
                        return Err(AppError::conflict(format!(
                            "Duplicate waitlist position {p} in class {}",
                            reg.class_id
                        )));
                    }
                }
                (RegistrationStatus::Enrolled, None) => {}
                (status, position) => {
                    return Err(AppError::validation(format!(
                        "Registration {} has status {status} with position {position:?}",
                        reg.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Registration store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistrationStore {
    state: Arc<Mutex<MemoryState>>,
    pending_contention: Arc<AtomicU32>,
}

impl MemoryRegistrationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an event.
    pub async fn insert_event(&self, event: Event) {
        self.state.lock().await.events.insert(event.id, event);
    }

    /// Add or replace a timeslot.
    pub async fn insert_timeslot(&self, timeslot: Timeslot) {
        self.state.lock().await.timeslots.insert(timeslot.id, timeslot);
    }

    /// Add or replace a location.
    pub async fn insert_location(&self, location: Location) {
        self.state.lock().await.locations.insert(location.id, location);
    }

    /// Add or replace a class.
    pub async fn insert_class(&self, class: Class) {
        self.state.lock().await.classes.insert(class.id, class);
    }

    /// Add or replace a user.
    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Write a registration row directly, skipping constraint checks.
    pub async fn insert_raw_registration(&self, registration: Registration) {
        self.state
            .lock()
            .await
            .registrations
            .insert(registration.id, registration);
    }

    /// Toggle whether a class accepts registrations.
    pub async fn set_class_active(&self, id: ClassId, active: bool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let class = state
            .classes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Class {id} not found")))?;
        class.is_active = active;
        Ok(())
    }

    /// Make the next `count` commits fail with a contention error.
    pub fn fail_next_commits(&self, count: u32) {
        self.pending_contention.store(count, Ordering::SeqCst);
    }

    /// Whether an attendance row exists for the registration.
    pub async fn has_attendance(&self, registration_id: RegistrationId) -> bool {
        self.state
            .lock()
            .await
            .attendance
            .contains(&registration_id)
    }

    /// Number of stored registrations.
    pub async fn registration_count(&self) -> usize {
        self.state.lock().await.registrations.len()
    }

    /// Take one pending injected failure, if any.
    fn take_contention(&self) -> bool {
        self.pending_contention
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            store: self.clone(),
        }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Transaction over a private copy of the store state.
struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    store: MemoryRegistrationStore,
}

impl MemoryTransaction {
    fn registration_mut(&mut self, id: RegistrationId) -> AppResult<&mut Registration> {
        self.working
            .registrations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Registration {id} not found")))
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_classes(&mut self, _class_ids: &[ClassId]) -> AppResult<()> {
        Ok(())
    }

    async fn lock_participant(&mut self, _user_id: UserId) -> AppResult<()> {
        Ok(())
    }

    async fn find_event(&mut self, id: EventId) -> AppResult<Option<Event>> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_class(&mut self, id: ClassId) -> AppResult<Option<ClassDetail>> {
        Ok(self.working.detail_by_id(id))
    }

    async fn find_group(
        &mut self,
        event_id: EventId,
        group_id: GroupId,
    ) -> AppResult<Vec<ClassDetail>> {
        let mut group: Vec<ClassDetail> = self
            .working
            .classes
            .values()
            .filter(|c| c.event_id == event_id && c.group_id == Some(group_id))
            .filter_map(|c| self.working.detail(c))
            .collect();
        group.sort_by_key(|d| (d.class.session_number.unwrap_or(i32::MAX), d.id()));
        Ok(group)
    }

    async fn list_classes(&mut self, event_id: EventId) -> AppResult<Vec<ClassDetail>> {
        let mut classes: Vec<ClassDetail> = self
            .working
            .classes
            .values()
            .filter(|c| c.event_id == event_id)
            .filter_map(|c| self.working.detail(c))
            .collect();
        classes.sort_by(|a, b| {
            (a.starts_at, &a.class.title, a.id()).cmp(&(b.starts_at, &b.class.title, b.id()))
        });
        Ok(classes)
    }

    async fn count_registrations(
        &mut self,
        class_id: ClassId,
        status: RegistrationStatus,
    ) -> AppResult<i64> {
        let count = self
            .working
            .registrations
            .values()
            .filter(|r| r.class_id == class_id && r.status == status)
            .count();
        Ok(count as i64)
    }

    async fn find_registration(
        &mut self,
        user_id: UserId,
        class_id: ClassId,
    ) -> AppResult<Option<Registration>> {
        Ok(self
            .working
            .registrations
            .values()
            .find(|r| r.user_id == user_id && r.class_id == class_id)
            .cloned())
    }

    async fn find_registration_by_id(
        &mut self,
        id: RegistrationId,
    ) -> AppResult<Option<Registration>> {
        Ok(self.working.registrations.get(&id).cloned())
    }

    async fn registrations_for_class(
        &mut self,
        class_id: ClassId,
    ) -> AppResult<Vec<Registration>> {
        let mut regs: Vec<Registration> = self
            .working
            .registrations
            .values()
            .filter(|r| r.class_id == class_id)
            .cloned()
            .collect();
        regs.sort_by_key(|r| (r.is_waitlisted(), r.position, r.created_at, r.id));
        Ok(regs)
    }

    async fn registrations_for_user(&mut self, user_id: UserId) -> AppResult<Vec<Registration>> {
        let mut regs: Vec<Registration> = self
            .working
            .registrations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        regs.sort_by_key(|r| (r.created_at, r.id));
        Ok(regs)
    }

    async fn waitlist(&mut self, class_id: ClassId) -> AppResult<Vec<Registration>> {
        let mut queue: Vec<Registration> = self
            .working
            .registrations
            .values()
            .filter(|r| r.class_id == class_id && r.is_waitlisted())
            .cloned()
            .collect();
        queue.sort_by_key(|r| (r.position, r.created_at));
        Ok(queue)
    }

    async fn find_enrolled_on_date(
        &mut self,
        user_id: UserId,
        event_id: EventId,
        date: NaiveDate,
        excluded: &[ClassId],
    ) -> AppResult<Option<(Registration, ClassDetail)>> {
        let mut hits: Vec<(Registration, ClassDetail)> = self
            .working
            .registrations
            .values()
            .filter(|r| r.user_id == user_id && r.is_enrolled())
            .filter(|r| !excluded.contains(&r.class_id))
            .filter_map(|r| {
                let detail = self.working.detail_by_id(r.class_id)?;
                let same_day = detail.event_id() == event_id
                    && detail.class.is_active
                    && detail.session_date() == date;
                same_day.then(|| (r.clone(), detail))
            })
            .collect();
        hits.sort_by_key(|(r, _)| (r.created_at, r.id));
        Ok(hits.into_iter().next())
    }

    async fn insert_registration(&mut self, data: NewRegistration) -> AppResult<Registration> {
        let duplicate = self
            .working
            .registrations
            .values()
            .any(|r| r.user_id == data.user_id && r.class_id == data.class_id);
        if duplicate {
            return Err(AppError::conflict(format!(
                "User {} is already registered for class {}",
                data.user_id, data.class_id
            )));
        }
        let registration = data.into_registration();
        self.working
            .registrations
            .insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn delete_registration(&mut self, id: RegistrationId) -> AppResult<bool> {
        let removed = self.working.registrations.remove(&id).is_some();
        if removed {
            self.working.attendance.remove(&id);
        }
        Ok(removed)
    }

    async fn mark_enrolled(&mut self, id: RegistrationId) -> AppResult<()> {
        let reg = self.registration_mut(id)?;
        reg.status = RegistrationStatus::Enrolled;
        reg.position = None;
        reg.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn set_position(&mut self, id: RegistrationId, position: i32) -> AppResult<()> {
        let reg = self.registration_mut(id)?;
        reg.position = Some(position);
        reg.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn create_attendance(&mut self, registration_id: RegistrationId) -> AppResult<()> {
        self.working.attendance.insert(registration_id);
        Ok(())
    }

    async fn delete_attendance(&mut self, registration_id: RegistrationId) -> AppResult<()> {
        self.working.attendance.remove(&registration_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction {
            mut guard,
            working,
            store,
        } = *self;

        if store.take_contention() {
            debug!("Injected contention, discarding transaction");
            return Err(AppError::contention("could not serialize access"));
        }
        working.validate()?;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use enrollhub_entity::user::UserRole;

    use super::*;

    async fn seeded() -> (MemoryRegistrationStore, ClassId, UserId) {
        let store = MemoryRegistrationStore::new();
        let event = Event::new("Camporee");
        let start = NaiveDate::from_ymd_opt(2026, 7, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let slot = Timeslot::new(event.id, start, start + chrono::Duration::hours(1));
        let class = Class::new(event.id, "Knots", slot.id, 10);
        let user = User::new("Ada", UserRole::Student);
        let (class_id, user_id) = (class.id, user.id);
        store.insert_event(event).await;
        store.insert_timeslot(slot).await;
        store.insert_class(class).await;
        store.insert_user(user).await;
        (store, class_id, user_id)
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() {
        let (store, class_id, user_id) = seeded().await;
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_registration(NewRegistration::enrolled(user_id, class_id))
                .await
                .unwrap();
        }
        assert_eq!(store.registration_count().await, 0);

        let mut tx = store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::enrolled(user_id, class_id))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.registration_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_waitlist_position_fails_commit() {
        let (store, class_id, user_id) = seeded().await;
        let other = User::new("Grace", UserRole::Student);
        let other_id = other.id;
        store.insert_user(other).await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::waitlisted(user_id, class_id, 1))
            .await
            .unwrap();
        tx.insert_registration(NewRegistration::waitlisted(other_id, class_id, 1))
            .await
            .unwrap();
        let err = tx.commit().await.unwrap_err();
        assert_eq!(err.kind, enrollhub_core::ErrorKind::Conflict);
        assert_eq!(store.registration_count().await, 0);
    }

    #[tokio::test]
    async fn test_injected_contention_fails_once() {
        let (store, class_id, user_id) = seeded().await;
        store.fail_next_commits(1);

        let mut tx = store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::enrolled(user_id, class_id))
            .await
            .unwrap();
        assert!(tx.commit().await.unwrap_err().is_retryable());

        let mut tx = store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::enrolled(user_id, class_id))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.registration_count().await, 1);
    }

    #[tokio::test]
    async fn test_same_day_lookup_skips_excluded_and_inactive() {
        let (store, class_id, user_id) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        tx.insert_registration(NewRegistration::enrolled(user_id, class_id))
            .await
            .unwrap();
        let detail = tx.find_class(class_id).await.unwrap().unwrap();
        let date = detail.session_date();

        let hit = tx
            .find_enrolled_on_date(user_id, detail.event_id(), date, &[])
            .await
            .unwrap();
        assert_eq!(hit.map(|(_, c)| c.id()), Some(class_id));

        let skipped = tx
            .find_enrolled_on_date(user_id, detail.event_id(), date, &[class_id])
            .await
            .unwrap();
        assert!(skipped.is_none());
        tx.commit().await.unwrap();

        store.set_class_active(class_id, false).await.unwrap();
        let mut tx = store.begin().await.unwrap();
        let inactive = tx
            .find_enrolled_on_date(user_id, detail.event_id(), date, &[])
            .await
            .unwrap();
        assert!(inactive.is_none());
    }
}
