//! # enrollhub-service
//!
//! The admission engine and its components. Components are leaves that
//! operate on a borrowed [`StoreTransaction`]; the [`AdmissionEngine`] owns
//! transaction scope, locking, retries, and the register/drop/promote state
//! machine.
//!
//! [`StoreTransaction`]: enrollhub_database::StoreTransaction

pub mod admission;
pub mod audit;
pub mod capacity;
pub mod conflict;
pub mod error;
pub mod gate;
pub mod retry;
pub mod session_group;
pub mod waitlist;

#[cfg(test)]
mod testing;

pub use admission::AdmissionEngine;
pub use error::{EnrollmentError, EnrollmentResult};
