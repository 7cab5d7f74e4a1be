//! Event, timeslot, and location entities.
//!
//! These are owned by the event-management collaborator; the engine only
//! reads them.

pub mod model;

pub use model::{Event, Location, Timeslot};
