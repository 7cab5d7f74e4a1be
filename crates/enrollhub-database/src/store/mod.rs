//! Transactional storage seam for the admission engine.
//!
//! Every engine operation runs inside one [`StoreTransaction`]: all reads
//! and writes it performs commit together or not at all. Dropping a
//! transaction without calling [`StoreTransaction::commit`] rolls it back.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::{ClassId, EventId, GroupId, RegistrationId, UserId};
use enrollhub_entity::class::ClassDetail;
use enrollhub_entity::event::Event;
use enrollhub_entity::registration::{NewRegistration, Registration, RegistrationStatus};
use enrollhub_entity::user::User;

/// Factory for registration transactions.
#[async_trait]
pub trait RegistrationStore: Send + Sync + fmt::Debug {
    /// Open a transaction at the strongest isolation the backend offers.
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// One atomic unit of registration work.
///
/// Failures caused by concurrent transactions surface as
/// [`enrollhub_core::ErrorKind::Contention`].
#[async_trait]
pub trait StoreTransaction: Send {
    /// Serialize writers on the given classes until the transaction ends.
    /// Ids are locked in ascending order.
    async fn lock_classes(&mut self, class_ids: &[ClassId]) -> AppResult<()>;

    /// Serialize writers on one participant until the transaction ends.
    async fn lock_participant(&mut self, user_id: UserId) -> AppResult<()>;

    /// Look up an event.
    async fn find_event(&mut self, id: EventId) -> AppResult<Option<Event>>;

    /// Look up a participant.
    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>>;

    /// Look up a class with its capacity inputs.
    async fn find_class(&mut self, id: ClassId) -> AppResult<Option<ClassDetail>>;

    /// All classes of a group inside an event, ordered by session number.
    async fn find_group(
        &mut self,
        event_id: EventId,
        group_id: GroupId,
    ) -> AppResult<Vec<ClassDetail>>;

    /// All classes of an event.
    async fn list_classes(&mut self, event_id: EventId) -> AppResult<Vec<ClassDetail>>;

    /// Number of registrations of a class with the given status.
    async fn count_registrations(
        &mut self,
        class_id: ClassId,
        status: RegistrationStatus,
    ) -> AppResult<i64>;

    /// The registration of a participant for a class.
    async fn find_registration(
        &mut self,
        user_id: UserId,
        class_id: ClassId,
    ) -> AppResult<Option<Registration>>;

    /// A registration by id.
    async fn find_registration_by_id(
        &mut self,
        id: RegistrationId,
    ) -> AppResult<Option<Registration>>;

    /// All registrations of a class: enrolled by creation time, then
    /// waitlisted by position.
    async fn registrations_for_class(&mut self, class_id: ClassId)
    -> AppResult<Vec<Registration>>;

    /// All registrations of a participant, oldest first.
    async fn registrations_for_user(&mut self, user_id: UserId) -> AppResult<Vec<Registration>>;

    /// The waitlist of a class ordered by position.
    async fn waitlist(&mut self, class_id: ClassId) -> AppResult<Vec<Registration>>;

    /// The oldest enrolled registration the participant holds in an active
    /// class of `event_id` on `date`, ignoring the classes in `excluded`.
    async fn find_enrolled_on_date(
        &mut self,
        user_id: UserId,
        event_id: EventId,
        date: NaiveDate,
        excluded: &[ClassId],
    ) -> AppResult<Option<(Registration, ClassDetail)>>;

    /// Insert a registration.
    async fn insert_registration(&mut self, data: NewRegistration) -> AppResult<Registration>;

    /// Delete a registration; returns whether it existed.
    async fn delete_registration(&mut self, id: RegistrationId) -> AppResult<bool>;

    /// Convert a waitlisted registration into an enrolled one.
    async fn mark_enrolled(&mut self, id: RegistrationId) -> AppResult<()>;

    /// Change the queue position of a waitlisted registration.
    async fn set_position(&mut self, id: RegistrationId, position: i32) -> AppResult<()>;

    /// Attendance hook: a seat was gained.
    async fn create_attendance(&mut self, registration_id: RegistrationId) -> AppResult<()>;

    /// Attendance hook: a seat was lost.
    async fn delete_attendance(&mut self, registration_id: RegistrationId) -> AppResult<()>;

    /// Make every write of this transaction visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write of this transaction.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
