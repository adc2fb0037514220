//! Standard pipeline hooks: credentials out, failure handling in.

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};

use super::error::{ApiError, FailureClass};
use super::pipeline::{ApiResponse, Flow, RequestHook, ResponseHook};
use crate::notify::{Navigator, Notice, Notifier};
use crate::state::session::SessionState;
use crate::state::token::TokenStore;
use crate::views::View;

/// Attaches `Authorization: Bearer <token>` when a token is stored.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    tokens: TokenStore,
}

impl BearerAuth {
    #[must_use]
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

impl RequestHook for BearerAuth {
    fn before_send(&self, request: &mut reqwest::Request) -> Result<Flow, ApiError> {
        let Some(token) = self.tokens.read() else {
            return Ok(Flow::Continue);
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::Internal(format!("invalid bearer token: {e}")))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(Flow::Continue)
    }
}

/// Forced logout on 401: notify, reset session and token, redirect.
///
/// Halts the response chain so the generic notifier stays quiet.
pub struct SessionExpiry {
    session: Arc<SessionState>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl SessionExpiry {
    #[must_use]
    pub fn new(session: Arc<SessionState>, notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, notifier, navigator }
    }
}

impl ResponseHook for SessionExpiry {
    fn after_receive(&self, outcome: &Result<ApiResponse, ApiError>) -> Flow {
        let Err(err) = outcome else {
            return Flow::Continue;
        };
        if err.class() != FailureClass::Unauthorized {
            return Flow::Continue;
        }
        tracing::warn!("server rejected credentials; forcing logout");
        self.notifier.notify(Notice::error(err.user_message()));
        if let Err(e) = self.session.reset() {
            tracing::warn!(error = %e, "session reset incomplete");
        }
        self.navigator.redirect(View::Root);
        Flow::Halt
    }
}

/// Shows one notice per failed call, worded by failure class.
pub struct FailureNotifier {
    notifier: Arc<dyn Notifier>,
}

impl FailureNotifier {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl ResponseHook for FailureNotifier {
    fn after_receive(&self, outcome: &Result<ApiResponse, ApiError>) -> Flow {
        if let Err(err) = outcome {
            self.notifier.notify(Notice::error(err.user_message()));
        }
        Flow::Continue
    }
}
