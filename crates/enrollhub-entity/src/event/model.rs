//! Event, timeslot, and location models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use enrollhub_core::types::id::{EventId, LocationId, TimeslotId};

/// A multi-day event that classes are scheduled into.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Whether participants may currently register or drop.
    pub registration_open: bool,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event with registration open.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            registration_open: true,
            created_at: Utc::now(),
        }
    }
}

/// A block of time on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Timeslot {
    /// Unique timeslot identifier.
    pub id: TimeslotId,
    /// Owning event.
    pub event_id: EventId,
    /// Local start time.
    pub start_time: NaiveDateTime,
    /// Local end time.
    pub end_time: NaiveDateTime,
}

impl Timeslot {
    /// Creates a timeslot for the given event.
    pub fn new(event_id: EventId, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            id: TimeslotId::new(),
            event_id,
            start_time,
            end_time,
        }
    }

    /// The calendar date this timeslot occupies.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }
}

/// A room with a physical seat limit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    /// Unique location identifier.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Number of seats in the room.
    pub max_capacity: i32,
}

impl Location {
    /// Creates a location.
    pub fn new(name: impl Into<String>, max_capacity: i32) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            max_capacity,
        }
    }
}
