//! Shared seeding helpers for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use enrollhub_core::config::{EngineConfig, RetryConfig};
use enrollhub_core::types::id::{ClassId, EventId, GroupId, UserId};
use enrollhub_database::MemoryRegistrationStore;
use enrollhub_entity::class::Class;
use enrollhub_entity::event::{Event, Timeslot};
use enrollhub_entity::registration::RegistrationStatus;
use enrollhub_entity::user::{User, UserRole, UserStatus};
use enrollhub_service::AdmissionEngine;
use enrollhub_service::admission::RosterEntry;
use enrollhub_service::audit::InvariantAuditor;

pub struct Camp {
    pub store: MemoryRegistrationStore,
    pub engine: AdmissionEngine,
    pub event: EventId,
}

pub fn fast_config() -> EngineConfig {
    EngineConfig {
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ..EngineConfig::default()
    }
}

impl Camp {
    pub async fn new() -> Self {
        let store = MemoryRegistrationStore::new();
        let event = Event::new("Summer Camporee");
        let event_id = event.id;
        store.insert_event(event).await;
        let engine = AdmissionEngine::new(Arc::new(store.clone()), &fast_config());
        Self {
            store,
            engine,
            event: event_id,
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 7, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    async fn slot(&self, day: u32, hour: u32) -> Timeslot {
        let start = Self::at(day, hour);
        let slot = Timeslot::new(self.event, start, start + chrono::Duration::minutes(50));
        self.store.insert_timeslot(slot.clone()).await;
        slot
    }

    /// A single-session class on `day` at `hour`.
    pub async fn class(&self, title: &str, day: u32, hour: u32, capacity: i32) -> ClassId {
        let slot = self.slot(day, hour).await;
        let class = Class::new(self.event, title, slot.id, capacity);
        let id = class.id;
        self.store.insert_class(class).await;
        id
    }

    /// A multi-session group; session `n` runs on day `n` at 13:00.
    pub async fn group(&self, title: &str, capacities: &[i32]) -> Vec<ClassId> {
        let group_id = GroupId::new();
        let mut ids = Vec::new();
        for (index, capacity) in capacities.iter().enumerate() {
            let number = index as i32 + 1;
            let slot = self.slot(number as u32, 13).await;
            let class = Class::new(self.event, title, slot.id, *capacity).in_group(group_id, number);
            ids.push(class.id);
            self.store.insert_class(class).await;
        }
        ids
    }

    /// A multi-session group whose sessions all run on `day`, one per
    /// `(hour, capacity)` pair.
    pub async fn group_on_day(
        &self,
        title: &str,
        day: u32,
        sessions: &[(u32, i32)],
    ) -> Vec<ClassId> {
        let group_id = GroupId::new();
        let mut ids = Vec::new();
        for (index, &(hour, capacity)) in sessions.iter().enumerate() {
            let slot = self.slot(day, hour).await;
            let class = Class::new(self.event, title, slot.id, capacity)
                .in_group(group_id, index as i32 + 1);
            ids.push(class.id);
            self.store.insert_class(class).await;
        }
        ids
    }

    pub async fn person(&self, name: &str, role: UserRole) -> UserId {
        let user = User::new(name, role);
        let id = user.id;
        self.store.insert_user(user).await;
        id
    }

    pub async fn student(&self, name: &str) -> UserId {
        self.person(name, UserRole::Student).await
    }

    pub async fn staff(&self, name: &str) -> UserId {
        self.person(name, UserRole::Staff).await
    }

    pub async fn inactive_student(&self, name: &str) -> UserId {
        let mut user = User::new(name, UserRole::Student);
        user.status = UserStatus::Inactive;
        let id = user.id;
        self.store.insert_user(user).await;
        id
    }

    pub async fn roster(&self, class_id: ClassId) -> Vec<RosterEntry> {
        self.engine.roster(class_id).await.unwrap()
    }

    /// `(participant, status, position)` for every roster line.
    pub async fn lines(&self, class_id: ClassId) -> Vec<(UserId, RegistrationStatus, Option<i32>)> {
        self.roster(class_id)
            .await
            .into_iter()
            .map(|e| (e.participant_id, e.status, e.position))
            .collect()
    }

    pub async fn assert_consistent(&self) {
        let auditor = InvariantAuditor::new(Arc::new(self.store.clone()));
        let violations = auditor.audit_event(self.event).await.unwrap();
        assert!(violations.is_empty(), "violations: {violations:?}");
    }
}
