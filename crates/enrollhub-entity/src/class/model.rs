//! Class entity model.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use enrollhub_core::types::id::{ClassId, EventId, GroupId, LocationId, TimeslotId, UserId};

/// A single scheduled offering of one subject at one timeslot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Class {
    /// Unique class identifier.
    pub id: ClassId,
    /// Owning event.
    pub event_id: EventId,
    /// Subject title.
    pub title: String,
    /// Instructor, if one is assigned.
    pub teacher_id: Option<UserId>,
    /// Timeslot the class occupies.
    pub timeslot_id: TimeslotId,
    /// Room, if one is assigned yet.
    pub location_id: Option<LocationId>,
    /// Seat limit declared by the instructor.
    pub teacher_max_students: i32,
    /// Inactive classes accept no registrations.
    pub is_active: bool,
    /// Multi-session group this class belongs to.
    pub group_id: Option<GroupId>,
    /// Ordinal of this class within its group (1-based).
    pub session_number: Option<i32>,
    /// Minimum investiture level, checked by the caller.
    pub min_level: Option<i32>,
    /// When the class was created.
    pub created_at: DateTime<Utc>,
    /// When the class was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// Creates an active, ungrouped class without a location.
    pub fn new(
        event_id: EventId,
        title: impl Into<String>,
        timeslot_id: TimeslotId,
        teacher_max_students: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClassId::new(),
            event_id,
            title: title.into(),
            teacher_id: None,
            timeslot_id,
            location_id: None,
            teacher_max_students,
            is_active: true,
            group_id: None,
            session_number: None,
            min_level: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assigns a room.
    pub fn with_location(mut self, location_id: LocationId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    /// Places the class into a multi-session group.
    pub fn in_group(mut self, group_id: GroupId, session_number: i32) -> Self {
        self.group_id = Some(group_id);
        self.session_number = Some(session_number);
        self
    }

    /// Requires a minimum investiture level.
    pub fn with_min_level(mut self, level: i32) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Marks the class inactive.
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// A class joined with the inputs the engine needs: the capacity of its
/// room and the start of its timeslot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClassDetail {
    /// The class row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: Class,
    /// `locations.max_capacity`, present iff a location is assigned.
    pub location_capacity: Option<i32>,
    /// `timeslots.start_time`.
    pub starts_at: NaiveDateTime,
}

impl ClassDetail {
    /// Shorthand for the class id.
    pub fn id(&self) -> ClassId {
        self.class.id
    }

    /// Shorthand for the event id.
    pub fn event_id(&self) -> EventId {
        self.class.event_id
    }

    /// The calendar date of the class; the unit of timeslot conflict.
    pub fn session_date(&self) -> NaiveDate {
        self.starts_at.date()
    }

    /// Whether the class is part of a multi-session group.
    pub fn is_grouped(&self) -> bool {
        self.class.group_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_session_date_ignores_time_of_day() {
        let start = NaiveDate::from_ymd_opt(2026, 7, 14)
            .and_then(|d| d.and_hms_opt(23, 30, 0))
            .expect("valid timestamp");
        let detail = ClassDetail {
            class: Class::new(EventId::new(), "Knots", TimeslotId::new(), 10),
            location_capacity: None,
            starts_at: start,
        };
        assert_eq!(
            detail.session_date(),
            NaiveDate::from_ymd_opt(2026, 7, 14).expect("valid date")
        );
        assert!(!detail.is_grouped());
    }

    #[test]
    fn test_builder_helpers() {
        let group = GroupId::new();
        let class = Class::new(EventId::new(), "Archery", TimeslotId::new(), 12)
            .in_group(group, 2)
            .with_min_level(3)
            .deactivated();
        assert_eq!(class.group_id, Some(group));
        assert_eq!(class.session_number, Some(2));
        assert_eq!(class.min_level, Some(3));
        assert!(!class.is_active);
    }
}
