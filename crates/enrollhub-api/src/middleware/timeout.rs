//! Per-request deadline.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Fails a request with 408 once `server.request_timeout_seconds` elapses.
///
/// The in-flight engine call is dropped with the future, which rolls back
/// its open transaction.
pub async fn request_timeout(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limit = Duration::from_secs(state.config.server.request_timeout_seconds);
    let path = request.uri().path().to_string();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, timeout_s = limit.as_secs(), "Request timed out");
            StatusCode::REQUEST_TIMEOUT.into_response()
        }
    }
}
