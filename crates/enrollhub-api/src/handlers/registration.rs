//! Participant-facing registration handlers.
//!
//! Both run the registration gate before reaching the engine.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use enrollhub_core::types::id::{ClassId, UserId};
use enrollhub_service::admission::{DropOutcome, RegisterOutcome};
use enrollhub_service::gate::GateAction;

use crate::dto::request::RegisterRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/classes/{class_id}/registrations
pub async fn register(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterOutcome>>), ApiError> {
    state
        .gate
        .check(req.participant_id, class_id, GateAction::Register)
        .await?;

    let outcome = state.engine.register(req.participant_id, class_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome))))
}

/// DELETE /api/classes/{class_id}/registrations/{participant_id}
pub async fn drop_registration(
    State(state): State<AppState>,
    Path((class_id, participant_id)): Path<(ClassId, UserId)>,
) -> Result<Json<ApiResponse<DropOutcome>>, ApiError> {
    state
        .gate
        .check(participant_id, class_id, GateAction::Drop)
        .await?;

    let outcome = state.engine.as_ref().drop(participant_id, class_id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
