//! Admission Engine.
//!
//! Orchestrates capacity, session groups, conflicts, and waitlists for
//! register, drop, and promotion. Every public operation runs in one store
//! transaction and is retried on contention.

pub mod engine;
pub mod outcome;
mod promotion;

pub use engine::AdmissionEngine;
pub use outcome::{
    AssignOutcome, ClassAvailability, ConflictInfo, DropOutcome, Promotion, RegisterOutcome,
    RosterEntry, ScheduleEntry, SessionOutcome,
};
