//! Request pipeline for every call to the gallery backend.
//!
//! ARCHITECTURE
//! ============
//! A call passes through two ordered hook lists:
//!
//! 1. request hooks decorate the outgoing `reqwest::Request` (credentials),
//! 2. the request is sent and the body read in full,
//! 3. response hooks inspect the outcome, success or failure, exactly once.
//!
//! Either list can stop early with `Flow::Halt`. A failure in step 1 skips
//! the send but still runs the response hooks, then reaches the caller
//! unchanged.
//!
//! TRADE-OFFS
//! ==========
//! Bodies are buffered so response hooks can read the server's `message`
//! field; gallery responses are small JSON documents.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::sync::Arc;

use reqwest::Method;
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::hooks::{BearerAuth, FailureNotifier, SessionExpiry};
use super::types::server_message;
use crate::notify::{Navigator, Notifier};
use crate::state::session::SessionState;

/// Whether the remaining hooks of a phase should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// Runs before a request is sent.
pub trait RequestHook: Send + Sync {
    fn before_send(&self, request: &mut reqwest::Request) -> Result<Flow, ApiError>;
}

/// Runs once per call after its outcome is known.
pub trait ResponseHook: Send + Sync {
    fn after_receive(&self, outcome: &Result<ApiResponse, ApiError>) -> Flow;
}

#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(Form),
}

/// One HTTP call, relative to the API root.
#[derive(Debug)]
pub struct ApiCall {
    pub method: Method,
    pub path: String,
    pub body: Body,
}

impl ApiCall {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: Body::Empty }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Internal(e.to_string()))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }
}

/// A 2xx response with its body read in full.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

pub struct Pipeline {
    http: reqwest::Client,
    api_root: String,
    request_hooks: Vec<Arc<dyn RequestHook>>,
    response_hooks: Vec<Arc<dyn ResponseHook>>,
}

impl Pipeline {
    /// A pipeline without hooks. `api_root` is prefixed to every call path.
    #[must_use]
    pub fn new(http: reqwest::Client, api_root: impl Into<String>) -> Self {
        let api_root = api_root.into().trim_end_matches('/').to_owned();
        Self { http, api_root, request_hooks: Vec::new(), response_hooks: Vec::new() }
    }

    /// Request hooks `[BearerAuth]`, response hooks `[SessionExpiry, FailureNotifier]`.
    #[must_use]
    pub fn standard(
        http: reqwest::Client,
        api_root: impl Into<String>,
        session: Arc<SessionState>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(http, api_root)
            .with_request_hook(BearerAuth::new(session.tokens().clone()))
            .with_response_hook(SessionExpiry::new(session, notifier.clone(), navigator))
            .with_response_hook(FailureNotifier::new(notifier))
    }

    #[must_use]
    pub fn with_request_hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.request_hooks.push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_response_hook(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.response_hooks.push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Full URL for a call path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.api_root)
        } else {
            format!("{}/{path}", self.api_root)
        }
    }

    /// Send `call` and run the response hooks on the outcome.
    ///
    /// The outcome is returned unchanged after the hooks ran, so a failure
    /// always reaches the caller.
    pub async fn send(&self, call: ApiCall) -> Result<ApiResponse, ApiError> {
        let method = call.method.clone();
        let path = call.path.clone();
        let outcome = self.dispatch(call).await;
        match &outcome {
            Ok(resp) => tracing::debug!(%method, %path, status = resp.status, "api call ok"),
            Err(e) => tracing::debug!(%method, %path, error = %e, "api call failed"),
        }
        for hook in &self.response_hooks {
            if hook.after_receive(&outcome) == Flow::Halt {
                break;
            }
        }
        outcome
    }

    async fn dispatch(&self, call: ApiCall) -> Result<ApiResponse, ApiError> {
        let mut request = self.build(call)?;
        for hook in &self.request_hooks {
            if hook.before_send(&mut request)? == Flow::Halt {
                break;
            }
        }

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if status.is_success() {
            Ok(ApiResponse { status: status.as_u16(), body })
        } else {
            Err(ApiError::status(status.as_u16(), server_message(&body)))
        }
    }

    fn build(&self, call: ApiCall) -> Result<reqwest::Request, ApiError> {
        let url = self.endpoint(&call.path);
        let builder = self.http.request(call.method, url);
        let builder = match call.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
        };
        builder.build().map_err(|e| ApiError::Internal(e.to_string()))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("api_root", &self.api_root)
            .field("request_hooks", &self.request_hooks.len())
            .field("response_hooks", &self.response_hooks.len())
            .finish_non_exhaustive()
    }
}
