//! # enrollhub-entity
//!
//! Domain entity models for EnrollHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod class;
pub mod event;
pub mod registration;
pub mod user;
