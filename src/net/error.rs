//! Failure taxonomy for calls to the gallery backend.
//!
//! ERROR HANDLING
//! ==============
//! Every failure a call can produce is an `ApiError`. `class()` maps it onto
//! the categories the response hooks and callers branch on; the pipeline
//! re-raises the same value after its side effects run.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden access. You don't have permission.";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found.";
pub const SERVER_ERROR_MESSAGE: &str = "Internal server error. Please try again later.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response reached the client.
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, message: Option<String> },

    /// The request could not be built or decorated before sending.
    #[error("{0}")]
    Internal(String),

    /// A 2xx body reported that the operation did not happen.
    #[error("{0}")]
    Rejected(String),

    /// A 2xx body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    Transport,
    Unauthorized,
    Forbidden,
    NotFound,
    /// Any other 4xx.
    Client,
    /// Any 5xx.
    Server,
    Internal,
    Rejected,
    Decode,
}

impl ApiError {
    #[must_use]
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self::Status { status, message }
    }

    #[must_use]
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Transport(_) => FailureClass::Transport,
            Self::Status { status: 401, .. } => FailureClass::Unauthorized,
            Self::Status { status: 403, .. } => FailureClass::Forbidden,
            Self::Status { status: 404, .. } => FailureClass::NotFound,
            Self::Status { status: 500..=599, .. } => FailureClass::Server,
            Self::Status { .. } => FailureClass::Client,
            Self::Internal(_) => FailureClass::Internal,
            Self::Rejected(_) => FailureClass::Rejected,
            Self::Decode(_) => FailureClass::Decode,
        }
    }

    /// The text shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => NETWORK_ERROR_MESSAGE.to_owned(),
            Self::Status { status: 401, .. } => SESSION_EXPIRED_MESSAGE.to_owned(),
            Self::Status { status: 403, .. } => FORBIDDEN_MESSAGE.to_owned(),
            Self::Status { status: 404, .. } => NOT_FOUND_MESSAGE.to_owned(),
            Self::Status { status: 500, .. } => SERVER_ERROR_MESSAGE.to_owned(),
            Self::Status { message: Some(message), .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Self::Internal(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
