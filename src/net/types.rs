//! Wire schema shared with the gallery backend.
//!
//! DESIGN
//! ======
//! The backend echoes arbitrary extra fields on users and images. Those are
//! kept in flattened maps so a session snapshot written back to storage loses
//! nothing the server sent.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the logged-in user as returned by `/auth/login`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into(), phone: None, extra: Map::new() }
    }
}

/// A stored gallery image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Title and path of an image after `/images/edit/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct EditedImage {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Account details submitted to `/auth/signup`.
#[derive(Clone, Debug, Serialize)]
pub struct SignupForm {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    #[serde(rename = "currentPassword")]
    pub current_password: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImagesResponse {
    pub user: ImagesOwner,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImagesOwner {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EditImageResponse {
    pub image: EditedImage,
}

#[derive(Debug, Serialize)]
pub(crate) struct RearrangeRequest<'a> {
    pub order: &'a [String],
}

/// Extract the string `message` field from a JSON error body, if any.
#[must_use]
pub fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}
