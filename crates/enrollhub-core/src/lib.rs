//! # enrollhub-core
//!
//! Core crate for EnrollHub. Contains configuration schemas, typed
//! identifiers, registration domain events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other EnrollHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
