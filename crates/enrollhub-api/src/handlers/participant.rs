//! Participant read handlers.

use axum::Json;
use axum::extract::{Path, State};

use enrollhub_core::types::id::UserId;
use enrollhub_service::admission::ScheduleEntry;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/participants/{participant_id}/registrations
pub async fn schedule(
    State(state): State<AppState>,
    Path(participant_id): Path<UserId>,
) -> Result<Json<ApiResponse<Vec<ScheduleEntry>>>, ApiError> {
    let schedule = state.engine.schedule(participant_id).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}
