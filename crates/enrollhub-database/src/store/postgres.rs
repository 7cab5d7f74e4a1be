//! PostgreSQL-backed registration store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::{ClassId, EventId, GroupId, RegistrationId, UserId};
use enrollhub_entity::class::ClassDetail;
use enrollhub_entity::event::Event;
use enrollhub_entity::registration::{NewRegistration, Registration, RegistrationStatus};
use enrollhub_entity::user::User;

use crate::error::map_db_error;
use crate::repositories::{
    AttendanceRepository, ClassRepository, EventRepository, RegistrationRepository,
    UserRepository,
};

use super::{RegistrationStore, StoreTransaction};

/// Store that runs every transaction at `SERIALIZABLE` with a bounded
/// lock wait.
#[derive(Debug, Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgRegistrationStore {
    /// Create a new store on the given pool.
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to set isolation level", e))?;

        let set_timeout = format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis()
        );
        sqlx::query(&set_timeout)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to set lock timeout", e))?;

        Ok(Box::new(PgStoreTransaction { tx }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| map_db_error("Health check failed", e))
    }
}

/// A single serializable PostgreSQL transaction.
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgStoreTransaction {
    /// Take a transaction-scoped advisory lock on a namespaced key.
    async fn advisory_lock(&mut self, key: String) -> AppResult<()> {
        debug!(key = %key, "Acquiring advisory lock");
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(key)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("Failed to acquire advisory lock", e))?;
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn lock_classes(&mut self, class_ids: &[ClassId]) -> AppResult<()> {
        let mut ids = class_ids.to_vec();
        ids.sort();
        ids.dedup();
        for id in ids {
            self.advisory_lock(format!("class:{id}")).await?;
        }
        Ok(())
    }

    async fn lock_participant(&mut self, user_id: UserId) -> AppResult<()> {
        self.advisory_lock(format!("user:{user_id}")).await
    }

    async fn find_event(&mut self, id: EventId) -> AppResult<Option<Event>> {
        EventRepository::find_by_id(&mut self.tx, id).await
    }

    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&mut self.tx, id).await
    }

    async fn find_class(&mut self, id: ClassId) -> AppResult<Option<ClassDetail>> {
        ClassRepository::find_detail(&mut self.tx, id).await
    }

    async fn find_group(
        &mut self,
        event_id: EventId,
        group_id: GroupId,
    ) -> AppResult<Vec<ClassDetail>> {
        ClassRepository::find_group(&mut self.tx, event_id, group_id).await
    }

    async fn list_classes(&mut self, event_id: EventId) -> AppResult<Vec<ClassDetail>> {
        ClassRepository::find_by_event(&mut self.tx, event_id).await
    }

    async fn count_registrations(
        &mut self,
        class_id: ClassId,
        status: RegistrationStatus,
    ) -> AppResult<i64> {
        RegistrationRepository::count_by_status(&mut self.tx, class_id, status).await
    }

    async fn find_registration(
        &mut self,
        user_id: UserId,
        class_id: ClassId,
    ) -> AppResult<Option<Registration>> {
        RegistrationRepository::find_by_user_and_class(&mut self.tx, user_id, class_id).await
    }

    async fn find_registration_by_id(
        &mut self,
        id: RegistrationId,
    ) -> AppResult<Option<Registration>> {
        RegistrationRepository::find_by_id(&mut self.tx, id).await
    }

    async fn registrations_for_class(
        &mut self,
        class_id: ClassId,
    ) -> AppResult<Vec<Registration>> {
        RegistrationRepository::find_by_class(&mut self.tx, class_id).await
    }

    async fn registrations_for_user(&mut self, user_id: UserId) -> AppResult<Vec<Registration>> {
        RegistrationRepository::find_by_user(&mut self.tx, user_id).await
    }

    async fn waitlist(&mut self, class_id: ClassId) -> AppResult<Vec<Registration>> {
        RegistrationRepository::find_waitlist(&mut self.tx, class_id).await
    }

    async fn find_enrolled_on_date(
        &mut self,
        user_id: UserId,
        event_id: EventId,
        date: NaiveDate,
        excluded: &[ClassId],
    ) -> AppResult<Option<(Registration, ClassDetail)>> {
        let Some(registration) = RegistrationRepository::find_enrolled_on_date(
            &mut self.tx,
            user_id,
            event_id,
            date,
            excluded,
        )
        .await?
        else {
            return Ok(None);
        };
        let class = ClassRepository::find_detail(&mut self.tx, registration.class_id).await?;
        Ok(class.map(|class| (registration, class)))
    }

    async fn insert_registration(&mut self, data: NewRegistration) -> AppResult<Registration> {
        RegistrationRepository::create(&mut self.tx, &data).await
    }

    async fn delete_registration(&mut self, id: RegistrationId) -> AppResult<bool> {
        RegistrationRepository::delete(&mut self.tx, id).await
    }

    async fn mark_enrolled(&mut self, id: RegistrationId) -> AppResult<()> {
        RegistrationRepository::mark_enrolled(&mut self.tx, id).await
    }

    async fn set_position(&mut self, id: RegistrationId, position: i32) -> AppResult<()> {
        RegistrationRepository::set_position(&mut self.tx, id, position).await
    }

    async fn create_attendance(&mut self, registration_id: RegistrationId) -> AppResult<()> {
        AttendanceRepository::create(&mut self.tx, registration_id).await
    }

    async fn delete_attendance(&mut self, registration_id: RegistrationId) -> AppResult<()> {
        AttendanceRepository::delete(&mut self.tx, registration_id).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_db_error("Failed to roll back transaction", e))
    }
}
