//! Class repository implementation.

use sqlx::PgConnection;

use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::{ClassId, EventId, GroupId};
use enrollhub_entity::class::ClassDetail;

use crate::error::map_db_error;

/// Base projection joining a class with its room capacity and start time.
const DETAIL_SELECT: &str = "SELECT c.*, l.max_capacity AS location_capacity, t.start_time AS starts_at \
     FROM classes c \
     JOIN timeslots t ON t.id = c.timeslot_id \
     LEFT JOIN locations l ON l.id = c.location_id";

/// Repository for class lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassRepository;

impl ClassRepository {
    /// Find a class with its location capacity and timeslot start.
    pub async fn find_detail(
        conn: &mut PgConnection,
        id: ClassId,
    ) -> AppResult<Option<ClassDetail>> {
        sqlx::query_as::<_, ClassDetail>(&format!("{DETAIL_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| map_db_error("Failed to find class", e))
    }

    /// All classes of a multi-session group, ordered by session number.
    pub async fn find_group(
        conn: &mut PgConnection,
        event_id: EventId,
        group_id: GroupId,
    ) -> AppResult<Vec<ClassDetail>> {
        sqlx::query_as::<_, ClassDetail>(&format!(
            "{DETAIL_SELECT} WHERE c.event_id = $1 AND c.group_id = $2 \
             ORDER BY c.session_number ASC NULLS LAST, c.id ASC"
        ))
        .bind(event_id)
        .bind(group_id)
        .fetch_all(conn)
        .await
        .map_err(|e| map_db_error("Failed to load class group", e))
    }

    /// All classes of an event, ordered by start time.
    pub async fn find_by_event(
        conn: &mut PgConnection,
        event_id: EventId,
    ) -> AppResult<Vec<ClassDetail>> {
        sqlx::query_as::<_, ClassDetail>(&format!(
            "{DETAIL_SELECT} WHERE c.event_id = $1 ORDER BY t.start_time ASC, c.title ASC"
        ))
        .bind(event_id)
        .fetch_all(conn)
        .await
        .map_err(|e| map_db_error("Failed to list event classes", e))
    }
}
