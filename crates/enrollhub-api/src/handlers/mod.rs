//! Request handlers, grouped by resource.

pub mod admin;
pub mod class;
pub mod health;
pub mod participant;
pub mod registration;
