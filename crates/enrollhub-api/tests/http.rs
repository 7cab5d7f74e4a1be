//! End-to-end HTTP tests against the in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use enrollhub_api::{AppState, build_app};
use enrollhub_core::config::AppConfig;
use enrollhub_core::types::id::{ClassId, EventId, UserId};
use enrollhub_database::MemoryRegistrationStore;
use enrollhub_entity::class::Class;
use enrollhub_entity::event::{Event, Timeslot};
use enrollhub_entity::user::{User, UserRole};

struct Harness {
    store: MemoryRegistrationStore,
    app: Router,
    event: EventId,
}

fn test_config() -> AppConfig {
    let mut config: AppConfig = serde_json::from_value(json!({
        "database": { "url": "postgres://unused/enrollhub" }
    }))
    .unwrap();
    config.engine.retry.initial_delay_ms = 1;
    config.engine.retry.max_delay_ms = 2;
    config
}

impl Harness {
    async fn new() -> Self {
        Self::with_event(Event::new("Winter Retreat")).await
    }

    async fn with_event(event: Event) -> Self {
        let store = MemoryRegistrationStore::new();
        let event_id = event.id;
        store.insert_event(event).await;

        let config = test_config();
        let cors = config.server.cors.clone();
        let state = AppState::new(config, Arc::new(store.clone()));
        Self {
            store,
            app: build_app(state, &cors),
            event: event_id,
        }
    }

    async fn class(&self, day: u32, capacity: i32) -> ClassId {
        self.class_with(day, capacity, |c| c).await
    }

    async fn class_with(&self, day: u32, capacity: i32, f: impl FnOnce(Class) -> Class) -> ClassId {
        let start = NaiveDate::from_ymd_opt(2026, 12, day)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap();
        let slot = Timeslot::new(self.event, start, start + chrono::Duration::hours(1));
        self.store.insert_timeslot(slot.clone()).await;
        let class = f(Class::new(self.event, "Knots", slot.id, capacity));
        let id = class.id;
        self.store.insert_class(class).await;
        id
    }

    async fn user(&self, name: &str, level: i32) -> UserId {
        let user = User::new(name, UserRole::Student).with_level(level);
        let id = user.id;
        self.store.insert_user(user).await;
        id
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(&self, class: ClassId, user: UserId) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            &format!("/api/classes/{class}/registrations"),
            Some(json!({ "participant_id": user })),
        )
        .await
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let h = Harness::new().await;
    let (status, body) = h.send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = h.send(Method::GET, "/api/health/detailed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "connected");
}

#[tokio::test]
async fn register_waitlist_and_promote_on_drop() {
    let h = Harness::new().await;
    let class = h.class(1, 1).await;
    let ann = h.user("Ann", 0).await;
    let ben = h.user("Ben", 0).await;

    let (status, body) = h.register(class, ann).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "enrolled");

    let (_, body) = h.register(class, ben).await;
    assert_eq!(body["data"]["status"], "waitlisted");
    assert_eq!(body["data"]["position"], 1);

    let (status, body) = h
        .send(Method::DELETE, &format!("/api/classes/{class}/registrations/{ann}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["promotions"][0]["user_id"], json!(ben));

    let (_, body) = h
        .send(Method::GET, &format!("/api/classes/{class}/roster"), None)
        .await;
    let roster = body["data"].as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["participant_id"], json!(ben));
    assert_eq!(roster[0]["status"], "enrolled");
    assert_eq!(roster[0]["position"], Value::Null);
}

#[tokio::test]
async fn availability_and_schedule_reflect_registrations() {
    let h = Harness::new().await;
    let class = h.class(2, 3).await;
    let ann = h.user("Ann", 0).await;
    h.register(class, ann).await;

    let (status, body) = h
        .send(Method::GET, &format!("/api/classes/{class}/availability"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrolled"], 1);
    assert_eq!(body["data"]["seats_remaining"], 2);

    let (status, body) = h
        .send(Method::GET, &format!("/api/participants/{ann}/registrations"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["class_id"], json!(class));

    let (_, body) = h
        .send(Method::GET, &format!("/api/classes/{class}/sessions"), None)
        .await;
    assert_eq!(body["data"]["multi_session"], false);
}

#[tokio::test]
async fn domain_errors_map_to_status_codes() {
    let h = Harness::new().await;
    let class = h.class(3, 2).await;
    let ann = h.user("Ann", 0).await;

    let (status, body) = h.register(ClassId::new(), ann).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    h.register(class, ann).await;
    let (status, body) = h.register(class, ann).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");

    let stranger = UserId::new();
    let (status, _) = h
        .send(Method::DELETE, &format!("/api/classes/{class}/registrations/{stranger}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn closed_event_blocks_participants_but_not_admins() {
    let mut event = Event::new("Closed Retreat");
    event.registration_open = false;
    let h = Harness::with_event(event).await;
    let class = h.class(4, 2).await;
    let ann = h.user("Ann", 0).await;

    let (status, body) = h.register(class, ann).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(h.store.registration_count().await, 0);

    let (status, body) = h
        .send(
            Method::POST,
            &format!("/api/admin/classes/{class}/assign"),
            Some(json!({ "participant_id": ann })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "registered");
    assert_eq!(body["data"]["detail"]["status"], "enrolled");
}

#[tokio::test]
async fn minimum_level_is_enforced_at_registration() {
    let h = Harness::new().await;
    let class = h.class_with(5, 4, |c| c.with_min_level(3)).await;
    let novice = h.user("Novice", 1).await;
    let expert = h.user("Expert", 5).await;

    let (status, _) = h.register(class, novice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.register(class, expert).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn admin_assign_reports_then_forces_past_conflict() {
    let h = Harness::new().await;
    let morning = h.class(6, 2).await;
    let afternoon = h.class(6, 2).await;
    let ann = h.user("Ann", 0).await;
    h.register(morning, ann).await;

    let uri = format!("/api/admin/classes/{afternoon}/assign");
    let (status, body) = h
        .send(Method::POST, &uri, Some(json!({ "participant_id": ann })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "conflict_detected");
    assert_eq!(body["data"]["detail"]["conflicting_class_id"], json!(morning));

    let (status, body) = h
        .send(
            Method::POST,
            &uri,
            Some(json!({ "participant_id": ann, "force": true, "reason": "instructor swap" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "registered");

    let (_, body) = h
        .send(Method::GET, &format!("/api/participants/{ann}/registrations"), None)
        .await;
    let schedule = body["data"].as_array().unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0]["class_id"], json!(afternoon));

    let (_, body) = h
        .send(Method::GET, &format!("/api/admin/events/{}/audit", h.event), None)
        .await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn assign_validates_reason_length() {
    let h = Harness::new().await;
    let class = h.class(7, 2).await;
    let ann = h.user("Ann", 0).await;

    let (status, body) = h
        .send(
            Method::POST,
            &format!("/api/admin/classes/{class}/assign"),
            Some(json!({ "participant_id": ann, "reason": "x".repeat(600) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["reason"].is_array());
}

#[tokio::test]
async fn exhausted_contention_is_service_unavailable() {
    let h = Harness::new().await;
    let class = h.class(8, 2).await;
    let ann = h.user("Ann", 0).await;
    h.store.fail_next_commits(3);

    let (status, body) = h.register(class, ann).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    assert_eq!(h.store.registration_count().await, 0);
}
