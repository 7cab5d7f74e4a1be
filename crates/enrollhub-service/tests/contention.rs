mod common;

use std::collections::HashSet;

use enrollhub_entity::registration::RegistrationStatus::{Enrolled, Waitlisted};
use enrollhub_service::EnrollmentError;

use common::Camp;

#[tokio::test]
async fn contention_is_retried_transparently() {
    let camp = Camp::new().await;
    let class = camp.class("Knots", 10, 9, 1).await;
    let a = camp.student("A").await;

    camp.store.fail_next_commits(2);
    let outcome = camp.engine.register(a, class).await.unwrap();
    assert_eq!(outcome.status, Enrolled);
    assert_eq!(camp.store.registration_count().await, 1);
}

#[tokio::test]
async fn persistent_contention_surfaces_unavailable() {
    let camp = Camp::new().await;
    let class = camp.class("Knots", 10, 9, 1).await;
    let a = camp.student("A").await;

    camp.store.fail_next_commits(10);
    let err = camp.engine.register(a, class).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::Unavailable { attempts: 3 }));
    assert_eq!(camp.store.registration_count().await, 0);
}

#[tokio::test]
async fn validation_errors_are_not_retried() {
    let camp = Camp::new().await;
    let class = camp.class("Knots", 10, 9, 1).await;
    let a = camp.student("A").await;
    camp.engine.register(a, class).await.unwrap();

    camp.store.fail_next_commits(1);
    assert!(matches!(
        camp.engine.register(a, class).await,
        Err(EnrollmentError::AlreadyRegistered { .. })
    ));
    // the injected failure is still pending because nothing was committed
    let b = camp.student("B").await;
    assert!(camp.engine.register(b, class).await.is_ok());
    assert_eq!(camp.store.registration_count().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_respect_capacity() {
    let camp = Camp::new().await;
    let class = camp.class("Knots", 10, 9, 3).await;
    let mut users = Vec::new();
    for i in 0..12 {
        users.push(camp.student(&format!("P{i}")).await);
    }

    let mut handles = Vec::new();
    for user in users.clone() {
        let engine = camp.engine.clone();
        handles.push(tokio::spawn(async move { engine.register(user, class).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let lines = camp.lines(class).await;
    assert_eq!(lines.len(), 12);
    assert_eq!(lines.iter().filter(|l| l.1 == Enrolled).count(), 3);
    let positions: Vec<_> = lines
        .iter()
        .filter(|l| l.1 == Waitlisted)
        .map(|l| l.2)
        .collect();
    assert_eq!(positions, (1..=9).map(Some).collect::<Vec<_>>());
    let seen: HashSet<_> = lines.iter().map(|l| l.0).collect();
    assert_eq!(seen.len(), 12);
    camp.assert_consistent().await;
}
