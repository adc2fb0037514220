//! Composition root: wires storage, session, pipeline, API and guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Hosts (the CLI, tests, an embedding UI) build one `GalleryClient` and go
//! through it for navigation (`enter`) and backend calls (`api`). All parts
//! share one `SessionState`, so a 401 seen by the pipeline is immediately
//! visible to the guard and to subscribers.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError};
use crate::guard::{AuthGuard, Verdict, now_epoch_secs};
use crate::net::api::GalleryApi;
use crate::net::pipeline::Pipeline;
use crate::notify::{Navigator, Notifier};
use crate::state::session::SessionState;
use crate::storage::{FileStorage, Storage, StorageError};
use crate::views::View;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("state storage: {0}")]
    Storage(#[from] StorageError),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct GalleryClient {
    config: ClientConfig,
    session: Arc<SessionState>,
    api: GalleryApi,
    guard: AuthGuard,
    navigator: Arc<dyn Navigator>,
}

impl GalleryClient {
    /// Open a client persisting to `config.state_dir`.
    pub fn open(
        config: ClientConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let storage = FileStorage::open(&config.state_dir)?;
        tracing::debug!(path = %storage.path().display(), "state storage opened");
        Self::with_storage(config, Arc::new(storage), notifier, navigator)
    }

    /// Build a client on top of any storage backend.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().connect_timeout(config.connect_timeout()).build()?;
        let session = Arc::new(SessionState::initialize(storage));
        let pipeline = Pipeline::standard(http, config.api_root(), session.clone(), notifier.clone(), navigator.clone());
        let api = GalleryApi::new(pipeline, session.clone(), notifier);
        let guard = AuthGuard::new(session.clone());
        Ok(Self { config, session, api, guard, navigator })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    #[must_use]
    pub fn api(&self) -> &GalleryApi {
        &self.api
    }

    #[must_use]
    pub fn guard(&self) -> &AuthGuard {
        &self.guard
    }

    /// Navigate to `view`. A denied navigation is redirected to the public
    /// entry view through the navigator.
    pub fn enter(&self, view: View) -> Verdict {
        self.enter_at(view, now_epoch_secs())
    }

    /// [`GalleryClient::enter`] as of `now` (epoch seconds).
    pub fn enter_at(&self, view: View, now: i64) -> Verdict {
        let verdict = self.guard.check_at(view, now);
        if let Some(target) = verdict.redirect() {
            self.navigator.redirect(target);
        }
        verdict
    }
}

impl std::fmt::Debug for GalleryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
