//! Event repository implementation.

use sqlx::PgConnection;

use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::EventId;
use enrollhub_entity::event::Event;

use crate::error::map_db_error;

/// Repository for event lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRepository;

impl EventRepository {
    /// Find an event by primary key.
    pub async fn find_by_id(conn: &mut PgConnection, id: EventId) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| map_db_error("Failed to find event", e))
    }
}
