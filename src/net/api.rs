//! REST bindings for the gallery backend.
//!
//! Every call goes through the shared `Pipeline`, so credentials, forced
//! logout on 401 and failure notices are handled there. This layer only adds
//! the per-endpoint success handling: decoding bodies, writing the session on
//! login and announcing completed actions.
//!
//! ERROR HANDLING
//! ==============
//! A 2xx body that reports failure (login without a token, reset without
//! `"success"`) becomes `ApiError::Rejected` carrying the server's message.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::path::Path;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};

use super::error::ApiError;
use super::pipeline::{ApiCall, Pipeline};
use super::types::{
    EditImageResponse, EditedImage, Image, ImagesResponse, LoginRequest, LoginResponse, MessageResponse,
    RearrangeRequest, ResetPasswordRequest, SignupForm, UserProfile,
};
use crate::notify::{Notice, Notifier};
use crate::state::session::SessionState;

pub const UNTITLED: &str = "Untitled";
const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";
const RESET_FAILED_MESSAGE: &str = "Password reset failed. Please try again.";

/// One file to upload with its title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub title: String,
}

impl ImageUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, title: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_owned();
        Self { file_name, mime, bytes, title: title.into() }
    }

    /// Read `path` from disk; the file name and MIME type come from the path.
    pub fn from_path(path: &Path, title: impl Into<String>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes, title))
    }

    fn part(&self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}

/// MIME type guessed from a file extension.
#[must_use]
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Sent as typed; only an empty title falls back to `Untitled`.
fn upload_title(title: &str) -> &str {
    if title.is_empty() { UNTITLED } else { title }
}

fn delete_image_path(image_id: &str) -> String {
    format!("/images/delete/{image_id}")
}

fn edit_image_path(image_id: &str) -> String {
    format!("/images/edit/{image_id}")
}

fn session_write_failed(e: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(format!("session store failed: {e}"))
}

pub struct GalleryApi {
    pipeline: Pipeline,
    session: Arc<SessionState>,
    notifier: Arc<dyn Notifier>,
}

impl GalleryApi {
    #[must_use]
    pub fn new(pipeline: Pipeline, session: Arc<SessionState>, notifier: Arc<dyn Notifier>) -> Self {
        Self { pipeline, session, notifier }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// `POST /auth/login`. On success the token and profile are stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let call = ApiCall::post("/auth/login").json(&LoginRequest { email, password })?;
        let body: LoginResponse = self.pipeline.send(call).await?.json()?;
        let Some(token) = body.token.filter(|t| !t.is_empty()) else {
            return Err(ApiError::Rejected(body.message.unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_owned())));
        };
        let user = body
            .user
            .ok_or_else(|| ApiError::Decode("login response has a token but no user".to_owned()))?;
        self.session.login(&token, user.clone()).map_err(session_write_failed)?;
        self.notifier.notify(Notice::success("Logged in successfully!"));
        Ok(user)
    }

    /// `POST /auth/signup`.
    pub async fn signup(&self, form: &SignupForm) -> Result<(), ApiError> {
        let call = ApiCall::post("/auth/signup").json(form)?;
        self.pipeline.send(call).await?;
        self.notifier.notify(Notice::success("Account created successfully!"));
        Ok(())
    }

    /// `POST /auth/reset-password`; the server answers `{"message":"success"}`.
    pub async fn reset_password(&self, current_password: &str, password: &str) -> Result<(), ApiError> {
        let call = ApiCall::post("/auth/reset-password").json(&ResetPasswordRequest { current_password, password })?;
        let resp = self.pipeline.send(call).await?;
        let body: MessageResponse = if resp.body.is_empty() { MessageResponse::default() } else { resp.json()? };
        if body.message.as_deref() != Some("success") {
            return Err(ApiError::Rejected(body.message.unwrap_or_else(|| RESET_FAILED_MESSAGE.to_owned())));
        }
        self.notifier.notify(Notice::success("Password reset successfully!"));
        Ok(())
    }

    /// Local logout: clears the token and the session. No server call.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.reset().map_err(session_write_failed)
    }

    /// `GET /images/data`.
    pub async fn list_images(&self) -> Result<Vec<Image>, ApiError> {
        let body: ImagesResponse = self.pipeline.send(ApiCall::get("/images/data")).await?.json()?;
        Ok(body.user.images)
    }

    /// `POST /images/upload` with one `images` part and one `titles[]` part
    /// per file.
    pub async fn upload_images(&self, uploads: &[ImageUpload]) -> Result<(), ApiError> {
        let mut form = Form::new();
        for upload in uploads {
            form = form
                .part("images", upload.part()?)
                .text("titles[]", upload_title(&upload.title).to_owned());
        }
        self.pipeline.send(ApiCall::post("/images/upload").multipart(form)).await?;
        self.notifier.notify(Notice::success("Images uploaded successfully!"));
        Ok(())
    }

    /// `DELETE /images/delete/{id}`.
    pub async fn delete_image(&self, image_id: &str) -> Result<(), ApiError> {
        self.pipeline.send(ApiCall::delete(delete_image_path(image_id))).await?;
        self.notifier.notify(Notice::success("Image deleted successfully"));
        Ok(())
    }

    /// `PUT /images/edit/{id}`: new title, optionally a replacement file.
    pub async fn edit_image(
        &self,
        image_id: &str,
        title: &str,
        replacement: Option<&ImageUpload>,
    ) -> Result<EditedImage, ApiError> {
        let mut form = Form::new().text("title", title.to_owned());
        if let Some(file) = replacement {
            form = form.part("image", file.part()?);
        }
        let call = ApiCall::put(edit_image_path(image_id)).multipart(form);
        let body: EditImageResponse = self.pipeline.send(call).await?.json()?;
        self.notifier.notify(Notice::success("Image updated successfully"));
        Ok(body.image)
    }

    /// `POST /images/rearrange` with the full display order.
    pub async fn rearrange_images(&self, order: &[String]) -> Result<(), ApiError> {
        let call = ApiCall::post("/images/rearrange").json(&RearrangeRequest { order })?;
        self.pipeline.send(call).await?;
        Ok(())
    }
}

impl std::fmt::Debug for GalleryApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryApi").field("pipeline", &self.pipeline).finish_non_exhaustive()
    }
}
