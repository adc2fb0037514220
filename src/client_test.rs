use std::path::PathBuf;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::guard::DenyReason;
use crate::net::error::{FailureClass, SESSION_EXPIRED_MESSAGE};
use crate::storage::MemoryStorage;
use crate::testing::{RecordingNavigator, RecordingNotifier, spawn_backend, token_expiring_at};

const NOW: i64 = 1_700_000_000;
const LATER: i64 = NOW + 3_600;

struct Harness {
    client: GalleryClient,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(base_url: &str, storage: Arc<dyn Storage>) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let config = ClientConfig::new(base_url, PathBuf::from("unused"), 5).unwrap();
    let client = GalleryClient::with_storage(config, storage, notifier.clone(), navigator.clone()).unwrap();
    Harness { client, notifier, navigator }
}

fn backend(token: String) -> Router {
    Router::new()
        .route(
            "/api/auth/login",
            post(move || {
                let token = token.clone();
                async move { Json(json!({ "token": token, "user": { "email": "alice@example.com", "id": "u1" } })) }
            }),
        )
        .route(
            "/api/images/data",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))) }),
        )
}

// =============================================================================
// navigation
// =============================================================================

#[test]
fn enter_protected_without_token_redirects_to_root() {
    let h = harness("http://127.0.0.1:9/", Arc::new(MemoryStorage::new()));

    let verdict = h.client.enter_at(View::Home, NOW);

    assert_eq!(verdict, Verdict::Deny(DenyReason::MissingToken));
    assert_eq!(h.navigator.redirects(), vec![View::Root]);
}

#[test]
fn enter_public_views_never_redirects() {
    let h = harness("http://127.0.0.1:9/", Arc::new(MemoryStorage::new()));

    for view in [View::Root, View::Login, View::Signup] {
        assert_eq!(h.client.enter_at(view, NOW), Verdict::Allow);
    }
    assert!(h.navigator.redirects().is_empty());
}

#[test]
fn config_api_root_feeds_pipeline() {
    let h = harness("http://127.0.0.1:9/gallery", Arc::new(MemoryStorage::new()));
    assert_eq!(h.client.api().pipeline().api_root(), "http://127.0.0.1:9/gallery/api");
    assert_eq!(h.client.config().connect_timeout_secs, 5);
}

// =============================================================================
// end to end
// =============================================================================

#[tokio::test]
async fn login_unlocks_protected_views() {
    let base = spawn_backend(backend(token_expiring_at(LATER))).await;
    let h = harness(&base, Arc::new(MemoryStorage::new()));

    let user = h.client.api().login("alice@example.com", "Secret1!").await.unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert!(h.client.session().is_authenticated());
    for view in [View::Home, View::AddImage, View::ResetPassword] {
        assert_eq!(h.client.enter_at(view, NOW), Verdict::Allow);
    }
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn expired_token_is_cleared_on_navigation() {
    let base = spawn_backend(backend(token_expiring_at(NOW - 1))).await;
    let h = harness(&base, Arc::new(MemoryStorage::new()));
    h.client.api().login("alice@example.com", "Secret1!").await.unwrap();

    let verdict = h.client.enter_at(View::Home, NOW);

    assert_eq!(verdict, Verdict::Deny(DenyReason::InvalidToken));
    assert!(!h.client.session().is_authenticated());
    assert_eq!(h.client.session().tokens().read(), None);
    assert_eq!(h.navigator.redirects(), vec![View::Root]);
}

#[tokio::test]
async fn unauthorized_response_logs_out_everywhere() {
    let base = spawn_backend(backend(token_expiring_at(LATER))).await;
    let h = harness(&base, Arc::new(MemoryStorage::new()));
    h.client.api().login("alice@example.com", "Secret1!").await.unwrap();
    let mut updates = h.client.session().subscribe();

    let err = h.client.api().list_images().await.unwrap_err();

    assert_eq!(err.class(), FailureClass::Unauthorized);
    assert!(updates.has_changed().unwrap());
    assert!(!updates.borrow_and_update().is_authenticated());
    assert_eq!(h.client.session().tokens().read(), None);
    assert_eq!(h.navigator.redirects(), vec![View::Root]);
    assert_eq!(
        h.notifier.messages().iter().filter(|m| m.as_str() == SESSION_EXPIRED_MESSAGE).count(),
        1
    );

    assert_eq!(h.client.enter_at(View::Home, NOW), Verdict::Deny(DenyReason::MissingToken));
}

#[tokio::test]
async fn session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_backend(backend(token_expiring_at(LATER))).await;
    let config = ClientConfig::new(&base, dir.path().to_path_buf(), 5).unwrap();

    {
        let client = GalleryClient::open(
            config.clone(),
            Arc::new(RecordingNotifier::default()),
            Arc::new(RecordingNavigator::default()),
        )
        .unwrap();
        client.api().login("alice@example.com", "Secret1!").await.unwrap();
    }

    let navigator = Arc::new(RecordingNavigator::default());
    let reopened = GalleryClient::open(config, Arc::new(RecordingNotifier::default()), navigator.clone()).unwrap();

    assert!(reopened.session().is_authenticated());
    let user = reopened.session().current().user().cloned().unwrap();
    assert_eq!(user.extra.get("id"), Some(&Value::from("u1")));
    assert_eq!(reopened.enter_at(View::Home, NOW), Verdict::Allow);

    reopened.api().logout().unwrap();
    assert_eq!(reopened.enter_at(View::Home, NOW), Verdict::Deny(DenyReason::MissingToken));
    assert_eq!(navigator.redirects(), vec![View::Root]);
}
