//! Attendance repository implementation.
//!
//! Attendance rows belong to the attendance collaborator. The engine only
//! creates the row when a participant gains a seat and removes it when the
//! seat is lost.

use sqlx::PgConnection;

use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::RegistrationId;

use crate::error::map_db_error;

/// Repository for attendance hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceRepository;

impl AttendanceRepository {
    /// Create the attendance row for an enrolled registration.
    pub async fn create(conn: &mut PgConnection, registration_id: RegistrationId) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO attendance (registration_id) VALUES ($1) \
             ON CONFLICT (registration_id) DO NOTHING",
        )
        .bind(registration_id)
        .execute(conn)
        .await
        .map_err(|e| map_db_error("Failed to create attendance", e))?;
        Ok(())
    }

    /// Remove the attendance row for a registration, if any.
    pub async fn delete(conn: &mut PgConnection, registration_id: RegistrationId) -> AppResult<()> {
        sqlx::query("DELETE FROM attendance WHERE registration_id = $1")
            .bind(registration_id)
            .execute(conn)
            .await
            .map_err(|e| map_db_error("Failed to delete attendance", e))?;
        Ok(())
    }
}
