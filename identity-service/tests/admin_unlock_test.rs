//! Administrative unlock: recovery path, idempotence, access control.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{body_json, TestApp, TEST_ADMIN_API_KEY};

#[tokio::test]
async fn unlock_restores_a_locked_account() {
    let app = TestApp::spawn_with_lockout(3, Duration::minutes(15)).await;
    let role = app.seed_role("Employee", 5, &[]);
    app.seed_identity("alice", "correct horse battery", role.role_id);

    for _ in 0..3 {
        app.login("alice", "incorrect donkey").await;
    }
    let locked = app.login("alice", "correct horse battery").await;
    assert_eq!(locked.status(), StatusCode::LOCKED);

    let response = app
        .post_admin(
            "/admin/identities/alice/unlock",
            Some(TEST_ADMIN_API_KEY),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["cleared_attempts"], 3);
    assert_eq!(body["was_locked"], true);

    let login = app.login("alice", "correct horse battery").await;
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
async fn unlock_is_idempotent() {
    let app = TestApp::spawn().await;
    let role = app.seed_role("Employee", 5, &[]);
    app.seed_identity("alice", "correct horse battery", role.role_id);

    app.login("alice", "incorrect donkey").await;

    let first = app
        .post_admin(
            "/admin/identities/alice/unlock",
            Some(TEST_ADMIN_API_KEY),
        )
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["cleared_attempts"], 1);

    // Repeating the action changes nothing and still succeeds.
    let second = app
        .post_admin(
            "/admin/identities/alice/unlock",
            Some(TEST_ADMIN_API_KEY),
        )
        .await;
    assert_eq!(second.status(), StatusCode::OK);
    let body = body_json(second).await;
    assert_eq!(body["cleared_attempts"], 0);
    assert_eq!(body["was_locked"], false);
}

#[tokio::test]
async fn unlock_requires_the_admin_api_key() {
    let app = TestApp::spawn().await;
    let role = app.seed_role("Employee", 5, &[]);
    app.seed_identity("alice", "correct horse battery", role.role_id);

    let missing = app.post_admin("/admin/identities/alice/unlock", None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .post_admin("/admin/identities/alice/unlock", Some("wrong-key"))
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unlock_of_an_unknown_identity_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_admin(
            "/admin/identities/nobody/unlock",
            Some(TEST_ADMIN_API_KEY),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
