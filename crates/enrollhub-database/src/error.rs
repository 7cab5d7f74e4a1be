//! Mapping of sqlx failures into [`AppError`].

use enrollhub_core::error::{AppError, ErrorKind};

/// `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";
/// `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";
/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error.
///
/// Serialization failures, deadlocks, and lock timeouts become
/// [`ErrorKind::Contention`] so the engine can retry the whole operation.
/// Unique violations become [`ErrorKind::Conflict`]. Everything else is a
/// plain database error.
pub fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    let kind = match code.as_deref() {
        Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE) => {
            ErrorKind::Contention
        }
        Some(UNIQUE_VIOLATION) => ErrorKind::Conflict,
        _ => ErrorKind::Database,
    };

    AppError::with_source(kind, format!("{context}: {err}"), err)
}
