//! Networking for the gallery REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `pipeline` runs every call through the ordered hooks in `hooks`, `error`
//! classifies failures, `api` binds the backend's endpoints, and `types`
//! defines the wire schema.

pub mod api;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod types;
