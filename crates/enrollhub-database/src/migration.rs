//! Schema migrations for the registration store.
//!
//! The embedded set creates events, timeslots, locations, users, classes,
//! registrations, and attendance. Waitlist positions are unique per class
//! under a deferred constraint so a renumbering can pass through duplicates
//! inside one transaction.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use enrollhub_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every embedded migration not yet recorded in `_sqlx_migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let known = MIGRATOR.iter().count();
    info!(migrations = known, "Applying registration schema");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to apply registration schema: {e}"),
            e,
        )
    })?;

    let latest = MIGRATOR.iter().map(|m| m.version).max();
    info!(migrations = known, latest = ?latest, "Registration schema up to date");
    Ok(())
}
