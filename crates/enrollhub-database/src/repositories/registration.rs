//! Registration repository implementation.

use chrono::NaiveDate;
use sqlx::PgConnection;
use uuid::Uuid;

use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::{ClassId, EventId, RegistrationId, UserId};
use enrollhub_entity::registration::{NewRegistration, Registration, RegistrationStatus};

use crate::error::map_db_error;

/// Repository for registration reads and writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationRepository;

impl RegistrationRepository {
    /// Find a registration by primary key.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: RegistrationId,
    ) -> AppResult<Option<Registration>> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| map_db_error("Failed to find registration", e))
    }

    /// Find the registration of a participant for a class.
    pub async fn find_by_user_and_class(
        conn: &mut PgConnection,
        user_id: UserId,
        class_id: ClassId,
    ) -> AppResult<Option<Registration>> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE user_id = $1 AND class_id = $2",
        )
        .bind(user_id)
        .bind(class_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_db_error("Failed to find registration", e))
    }

    /// Count registrations of a class with the given status.
    pub async fn count_by_status(
        conn: &mut PgConnection,
        class_id: ClassId,
        status: RegistrationStatus,
    ) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE class_id = $1 AND status = $2",
        )
        .bind(class_id)
        .bind(status)
        .fetch_one(conn)
        .await
        .map_err(|e| map_db_error("Failed to count registrations", e))
    }

    /// All registrations of a class: enrolled by creation time, then the
    /// waitlist by position.
    pub async fn find_by_class(
        conn: &mut PgConnection,
        class_id: ClassId,
    ) -> AppResult<Vec<Registration>> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE class_id = $1 \
             ORDER BY CASE status WHEN 'enrolled' THEN 0 ELSE 1 END, \
                      position ASC NULLS FIRST, created_at ASC, id ASC",
        )
        .bind(class_id)
        .fetch_all(conn)
        .await
        .map_err(|e| map_db_error("Failed to list class registrations", e))
    }

    /// All registrations held by a participant.
    pub async fn find_by_user(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> AppResult<Vec<Registration>> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
        .map_err(|e| map_db_error("Failed to list user registrations", e))
    }

    /// The waitlist of a class, ordered by position.
    pub async fn find_waitlist(
        conn: &mut PgConnection,
        class_id: ClassId,
    ) -> AppResult<Vec<Registration>> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE class_id = $1 AND status = 'waitlisted' \
             ORDER BY position ASC, created_at ASC",
        )
        .bind(class_id)
        .fetch_all(conn)
        .await
        .map_err(|e| map_db_error("Failed to load waitlist", e))
    }

    /// The oldest enrolled registration of a participant in an active class
    /// of `event_id` held on `date`, skipping the classes in `excluded`.
    pub async fn find_enrolled_on_date(
        conn: &mut PgConnection,
        user_id: UserId,
        event_id: EventId,
        date: NaiveDate,
        excluded: &[ClassId],
    ) -> AppResult<Option<Registration>> {
        let excluded: Vec<Uuid> = excluded.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_as::<_, Registration>(
            "SELECT r.* FROM registrations r \
             JOIN classes c ON c.id = r.class_id \
             JOIN timeslots t ON t.id = c.timeslot_id \
             WHERE r.user_id = $1 AND r.status = 'enrolled' \
               AND c.event_id = $2 AND c.is_active \
               AND t.start_time::date = $3 \
               AND NOT (r.class_id = ANY($4)) \
             ORDER BY r.created_at ASC, r.id ASC \
             LIMIT 1",
        )
        .bind(user_id)
        .bind(event_id)
        .bind(date)
        .bind(excluded)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_db_error("Failed to check same-day enrollment", e))
    }

    /// Insert a registration.
    pub async fn create(
        conn: &mut PgConnection,
        data: &NewRegistration,
    ) -> AppResult<Registration> {
        sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, user_id, class_id, status, position) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(RegistrationId::new())
        .bind(data.user_id)
        .bind(data.class_id)
        .bind(data.status)
        .bind(data.position)
        .fetch_one(conn)
        .await
        .map_err(|e| map_db_error("Failed to create registration", e))
    }

    /// Delete a registration. Returns whether a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: RegistrationId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| map_db_error("Failed to delete registration", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Turn a waitlisted registration into an enrolled one.
    pub async fn mark_enrolled(conn: &mut PgConnection, id: RegistrationId) -> AppResult<()> {
        sqlx::query(
            "UPDATE registrations SET status = 'enrolled', position = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(conn)
        .await
        .map_err(|e| map_db_error("Failed to enroll registration", e))?;
        Ok(())
    }

    /// Move a waitlisted registration to a new queue position.
    pub async fn set_position(
        conn: &mut PgConnection,
        id: RegistrationId,
        position: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE registrations SET position = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(position)
            .execute(conn)
            .await
            .map_err(|e| map_db_error("Failed to update waitlist position", e))?;
        Ok(())
    }
}
