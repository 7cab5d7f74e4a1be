//! Class read handlers.

use axum::Json;
use axum::extract::{Path, State};

use enrollhub_core::types::id::ClassId;
use enrollhub_service::admission::{ClassAvailability, RosterEntry};

use crate::dto::response::{ApiResponse, SessionsResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/classes/{class_id}/roster
pub async fn roster(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
) -> Result<Json<ApiResponse<Vec<RosterEntry>>>, ApiError> {
    let roster = state.engine.roster(class_id).await?;
    Ok(Json(ApiResponse::ok(roster)))
}

/// GET /api/classes/{class_id}/availability
pub async fn availability(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
) -> Result<Json<ApiResponse<ClassAvailability>>, ApiError> {
    let availability = state.engine.availability(class_id).await?;
    Ok(Json(ApiResponse::ok(availability)))
}

/// GET /api/classes/{class_id}/sessions
pub async fn sessions(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
) -> Result<Json<ApiResponse<SessionsResponse>>, ApiError> {
    let sessions = state.engine.group_of(class_id).await?;
    Ok(Json(ApiResponse::ok(SessionsResponse {
        multi_session: sessions.len() > 1,
        sessions,
    })))
}
