//! User repository implementation.

use sqlx::PgConnection;

use enrollhub_core::result::AppResult;
use enrollhub_core::types::id::UserId;
use enrollhub_entity::user::User;

use crate::error::map_db_error;

/// Repository for participant lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Find a user by primary key.
    pub async fn find_by_id(conn: &mut PgConnection, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| map_db_error("Failed to find user by id", e))
    }
}
