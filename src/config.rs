//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const STATE_DIR_NAME: &str = "gallery-session";
pub const FALLBACK_STATE_DIR: &str = ".gallery";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, always ending in `/`.
    pub base_url: String,
    pub state_dir: PathBuf,
    pub connect_timeout_secs: u64,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `GALLERY_BASE_URL`: default `http://127.0.0.1:5000/`
    /// - `GALLERY_STATE_DIR`: default `<data_local_dir>/gallery-session`
    /// - `GALLERY_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a caller-supplied lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("GALLERY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let state_dir = lookup("GALLERY_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(default_state_dir, PathBuf::from);
        let connect_timeout_secs = lookup("GALLERY_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        Self::new(&base_url, state_dir, connect_timeout_secs)
    }

    /// Validate and normalise explicit settings.
    pub fn new(base_url: &str, state_dir: PathBuf, connect_timeout_secs: u64) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { base_url, state_dir, connect_timeout_secs })
    }

    /// Prefix for every backend call: `{base_url}api`.
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}api", self.base_url)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[must_use]
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(|| PathBuf::from(FALLBACK_STATE_DIR), |d| d.join(STATE_DIR_NAME))
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl { url: raw.to_string(), reason };
    let trimmed = raw.trim();
    let parsed = reqwest::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".into()));
    }
    let mut url = trimmed.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
