//! Seeding helpers for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{NaiveDate, NaiveDateTime};

use enrollhub_core::types::id::{ClassId, EventId, GroupId, UserId};
use enrollhub_database::MemoryRegistrationStore;
use enrollhub_entity::class::Class;
use enrollhub_entity::event::{Event, Location, Timeslot};
use enrollhub_entity::user::{User, UserRole};

pub(crate) struct Fixture {
    pub store: MemoryRegistrationStore,
    pub event: EventId,
    next_day: AtomicU32,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = MemoryRegistrationStore::new();
        let event = Event::new("Summer Camporee");
        let event_id = event.id;
        store.insert_event(event).await;
        Self {
            store,
            event: event_id,
            next_day: AtomicU32::new(10),
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 7, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    async fn timeslot(&self, day: u32, hour: u32) -> Timeslot {
        let start = Self::at(day, hour);
        let slot = Timeslot::new(self.event, start, start + chrono::Duration::minutes(50));
        self.store.insert_timeslot(slot.clone()).await;
        slot
    }

    async fn insert(&self, class: Class) -> ClassId {
        let id = class.id;
        self.store.insert_class(class).await;
        id
    }

    /// A class on a day no other fixture class uses.
    pub async fn class(&self, capacity: i32) -> ClassId {
        let day = self.next_day.fetch_add(1, Ordering::SeqCst);
        self.class_at(day, 9, capacity).await
    }

    pub async fn class_at(&self, day: u32, hour: u32, capacity: i32) -> ClassId {
        let slot = self.timeslot(day, hour).await;
        self.insert(Class::new(self.event, "Knot Tying", slot.id, capacity))
            .await
    }

    pub async fn class_in_room(&self, teacher_limit: i32, room: i32) -> ClassId {
        let day = self.next_day.fetch_add(1, Ordering::SeqCst);
        let slot = self.timeslot(day, 9).await;
        let location = Location::new("Lodge", room);
        let location_id = location.id;
        self.store.insert_location(location).await;
        self.insert(
            Class::new(self.event, "First Aid", slot.id, teacher_limit).with_location(location_id),
        )
        .await
    }

    /// Classes of one group, session `n` held on day `n`.
    pub async fn group(&self, sessions: &[(i32, i32)]) -> Vec<ClassId> {
        let group_id = GroupId::new();
        let mut ids = Vec::new();
        for &(number, capacity) in sessions {
            let slot = self.timeslot(number as u32, 9).await;
            let class = Class::new(self.event, "Drilling", slot.id, capacity)
                .in_group(group_id, number);
            ids.push(self.insert(class).await);
        }
        ids
    }

    /// Classes of one group sharing a fresh day, one per `(hour, capacity)`.
    pub async fn group_on_day(&self, sessions: &[(u32, i32)]) -> Vec<ClassId> {
        let day = self.next_day.fetch_add(1, Ordering::SeqCst);
        let group_id = GroupId::new();
        let mut ids = Vec::new();
        for (index, &(hour, capacity)) in sessions.iter().enumerate() {
            let slot = self.timeslot(day, hour).await;
            let class = Class::new(self.event, "Pioneering", slot.id, capacity)
                .in_group(group_id, index as i32 + 1);
            ids.push(self.insert(class).await);
        }
        ids
    }

    pub async fn student(&self, name: &str) -> UserId {
        self.user(name, UserRole::Student).await
    }

    pub async fn user(&self, name: &str, role: UserRole) -> UserId {
        let user = User::new(name, role);
        let id = user.id;
        self.store.insert_user(user).await;
        id
    }
}
