//! Administrative handlers. These bypass the registration gate.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use enrollhub_core::types::id::{ClassId, EventId};
use enrollhub_service::admission::AssignOutcome;
use enrollhub_service::audit::Violation;

use crate::dto::request::AssignRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/admin/classes/{class_id}/assign
///
/// Without `force`, a same-date enrollment comes back as
/// `conflict_detected` and nothing is written. With `force`, conflicting
/// enrollments are evicted and their seats backfilled.
pub async fn assign(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<ApiResponse<AssignOutcome>>, ApiError> {
    req.validate()?;

    tracing::info!(
        participant_id = %req.participant_id,
        class_id = %class_id,
        force = req.force,
        reason = req.reason.as_deref().unwrap_or(""),
        "Administrative assignment"
    );

    let outcome = if req.force {
        AssignOutcome::Registered(state.engine.force_assign(req.participant_id, class_id).await?)
    } else {
        state.engine.admin_assign(req.participant_id, class_id).await?
    };

    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/admin/events/{event_id}/audit
pub async fn audit(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<ApiResponse<Vec<Violation>>>, ApiError> {
    let violations = state.auditor.audit_event(event_id).await?;
    Ok(Json(ApiResponse::ok(violations)))
}
