//! # enrollhub-api
//!
//! HTTP API layer for EnrollHub built on Axum.
//!
//! Exposes registration, drop, roster, availability, schedule and
//! administrative assignment endpoints over the admission engine. The
//! participant-facing endpoints run the registration gate first.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
