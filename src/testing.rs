//! Shared test fixtures: recording notifier/navigator, token minting and an
//! in-process stub backend.

use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::notify::{Navigator, Notice, Notifier};
use crate::views::View;

#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingNavigator {
    redirects: Mutex<Vec<View>>,
}

impl RecordingNavigator {
    pub(crate) fn redirects(&self) -> Vec<View> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, view: View) {
        self.redirects.lock().unwrap().push(view);
    }
}

/// Unsigned JWT-shaped token whose `exp` claim is `exp`.
pub(crate) fn token_expiring_at(exp: i64) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"u1","exp":{exp}}}"#));
    format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.c2ln")
}

/// Serve `router` on an ephemeral port; returns the base URL (with `/`).
pub(crate) async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

/// A base URL nothing listens on.
pub(crate) async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}
