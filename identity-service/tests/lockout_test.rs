//! Lockout lifecycle: threshold, lock window, lazy expiry, concurrency.

mod common;

use axum::http::{header, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, TestApp};
use identity_service::models::Identity;
use identity_service::utils::{hash_password, Password};

#[tokio::test]
async fn fifth_failure_locks_even_against_the_correct_password() {
    let app = TestApp::spawn().await;
    let role = app.seed_role("Employee", 5, &[]);
    let identity = app.seed_identity("alice", "correct horse battery", role.role_id);

    for _ in 0..5 {
        let response = app.login("alice", "incorrect donkey").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let stored = app.store.get_identity(identity.identity_id).unwrap();
    assert_eq!(stored.failed_attempts, 5);
    assert!(stored.locked_until.is_some());

    // The sixth attempt carries the right password and is still refused.
    let response = app.login("alice", "correct horse battery").await;
    assert_eq!(response.status(), StatusCode::LOCKED);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["reason"], "locked");

    let retry_after = body["retry_after_seconds"].as_u64().unwrap();
    assert!(
        (890..=900).contains(&retry_after),
        "retry_after_seconds was {retry_after}, expected ~900"
    );
}

#[tokio::test]
async fn attempts_while_locked_do_not_advance_the_counter() {
    let app = TestApp::spawn().await;
    let role = app.seed_role("Employee", 5, &[]);
    let identity = app.seed_identity("alice", "correct horse battery", role.role_id);

    for _ in 0..5 {
        app.login("alice", "incorrect donkey").await;
    }
    let locked_at = app
        .store
        .get_identity(identity.identity_id)
        .unwrap()
        .locked_until;

    // Further attempts are short-circuited before any password comparison,
    // so neither the counter nor the window moves.
    for _ in 0..3 {
        let response = app.login("alice", "incorrect donkey").await;
        assert_eq!(response.status(), StatusCode::LOCKED);
    }

    let stored = app.store.get_identity(identity.identity_id).unwrap();
    assert_eq!(stored.failed_attempts, 5);
    assert_eq!(stored.locked_until, locked_at);
}

// Lazy expiry: a lock whose window has passed permits the attempt even
// though the counter still sits at the threshold; success then reconciles
// the stale state.
#[tokio::test]
async fn expired_lock_permits_login_and_success_resets_state() {
    let app = TestApp::spawn().await;
    let role = app.seed_role("Employee", 5, &[]);

    let hash = hash_password(&Password::new("correct horse battery".to_string())).unwrap();
    let mut identity = Identity::new("alice".to_string(), hash.into_string(), role.role_id);
    identity.failed_attempts = 5;
    identity.locked_until = Some(Utc::now() - Duration::seconds(1));
    app.store.insert_identity(identity.clone());

    let response = app.login("alice", "correct horse battery").await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = app.store.get_identity(identity.identity_id).unwrap();
    assert_eq!(stored.failed_attempts, 0);
    assert!(stored.locked_until.is_none());
}

#[tokio::test]
async fn full_lock_cycle_with_a_short_window() {
    let app = TestApp::spawn_with_lockout(5, Duration::milliseconds(200)).await;
    let role = app.seed_role("Employee", 5, &[]);
    app.seed_identity("alice", "correct horse battery", role.role_id);

    for _ in 0..5 {
        app.login("alice", "incorrect donkey").await;
    }
    let response = app.login("alice", "correct horse battery").await;
    assert_eq!(response.status(), StatusCode::LOCKED);

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let response = app.login("alice", "correct horse battery").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// Concurrent failures must serialize their counter increments: K
// simultaneous wrong-password attempts below the threshold end at exactly K.
#[tokio::test]
async fn concurrent_failures_are_not_lost() {
    let app = TestApp::spawn().await;
    let role = app.seed_role("Employee", 5, &[]);
    let identity = app.seed_identity("alice", "correct horse battery", role.role_id);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            use tower::util::ServiceExt;
            let request = axum::http::Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::json!({ "username": "alice", "password": "incorrect donkey" })
                        .to_string(),
                ))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::UNAUTHORIZED);
    }

    let stored = app.store.get_identity(identity.identity_id).unwrap();
    assert_eq!(stored.failed_attempts, 4);
    assert!(stored.locked_until.is_none());
}

// Above the threshold only one lock window may be established; attempts that
// already passed the lockout gate keep incrementing the counter but must not
// move the window.
#[tokio::test]
async fn over_threshold_failures_share_one_lock_window() {
    let app = TestApp::spawn_with_lockout(2, Duration::minutes(15)).await;
    let role = app.seed_role("Employee", 5, &[]);
    let identity = app.seed_identity("alice", "correct horse battery", role.role_id);

    app.login("alice", "incorrect donkey").await;
    app.login("alice", "incorrect donkey").await;

    let first_window = app
        .store
        .get_identity(identity.identity_id)
        .unwrap()
        .locked_until
        .expect("second failure should have tripped the lock");

    app.login("alice", "incorrect donkey").await;

    let stored = app.store.get_identity(identity.identity_id).unwrap();
    assert_eq!(stored.locked_until, Some(first_window));
}
