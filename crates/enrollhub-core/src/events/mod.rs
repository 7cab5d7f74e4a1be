//! Domain events emitted by admission engine operations.
//!
//! Every engine outcome carries the events it produced so that callers
//! (audit logging, notifications) can react without re-reading the store.

pub mod registration;

pub use registration::RegistrationEvent;
