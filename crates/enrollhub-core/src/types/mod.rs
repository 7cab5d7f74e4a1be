//! Core type definitions used across the EnrollHub workspace.

pub mod id;

pub use id::*;
