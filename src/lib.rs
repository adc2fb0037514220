//! Authentication and session layer of the image gallery client.
//!
//! ARCHITECTURE
//! ============
//! - `storage`: string key/value persistence (in memory or a JSON file).
//! - `state`: the bearer token and the observable session built on it.
//! - `claims` + `guard`: expiry decoding and the protected-view guard.
//! - `net`: the request pipeline with its auth and failure hooks, and the
//!   gallery endpoints bound on top of it.
//! - `gallery`, `validate`: local image ordering and form checks.
//! - `client`: wires everything from a `ClientConfig`.

pub mod claims;
pub mod client;
pub mod config;
pub mod gallery;
pub mod guard;
pub mod net;
pub mod notify;
pub mod state;
pub mod storage;
pub mod validate;
pub mod views;

#[cfg(test)]
mod testing;

pub use client::{ClientError, GalleryClient};
pub use config::{ClientConfig, ConfigError};
pub use guard::{AuthGuard, DenyReason, Verdict};
pub use net::api::{GalleryApi, ImageUpload};
pub use net::error::{ApiError, FailureClass};
pub use net::types::{EditedImage, Image, SignupForm, UserProfile};
pub use notify::{Level, Navigator, Notice, Notifier};
pub use state::session::{Session, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use views::View;
