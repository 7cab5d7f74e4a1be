//! Route definitions for the EnrollHub HTTP API.
//!
//! All routes are mounted under `/api` and receive `AppState` through
//! Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with all routes and per-request middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(registration_routes())
        .merge(class_routes())
        .merge(participant_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::timeout::request_timeout,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Register and drop
fn registration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/classes/{class_id}/registrations",
            post(handlers::registration::register),
        )
        .route(
            "/classes/{class_id}/registrations/{participant_id}",
            delete(handlers::registration::drop_registration),
        )
}

/// Class read models
fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/classes/{class_id}/roster", get(handlers::class::roster))
        .route(
            "/classes/{class_id}/availability",
            get(handlers::class::availability),
        )
        .route("/classes/{class_id}/sessions", get(handlers::class::sessions))
}

fn participant_routes() -> Router<AppState> {
    Router::new().route(
        "/participants/{participant_id}/registrations",
        get(handlers::participant::schedule),
    )
}

/// Administrative assignment and audit
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/classes/{class_id}/assign",
            post(handlers::admin::assign),
        )
        .route("/admin/events/{event_id}/audit", get(handlers::admin::audit))
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
