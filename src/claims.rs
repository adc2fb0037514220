//! Client-side reading of the token's expiration claim.
//!
//! The signature is never checked here; the server remains the authority.
//! The claim is only used to log a user out early instead of waiting for a 401.

#[cfg(test)]
#[path = "claims_test.rs"]
mod claims_test;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    #[error("token must have three dot-separated segments, found {0}")]
    Segments(usize),
    #[error("token payload is not base64url: {0}")]
    Base64(String),
    #[error("token payload is not JSON: {0}")]
    Json(String),
    #[error("token payload has no numeric `exp` claim")]
    MissingExpiry,
}

/// Decode the `exp` claim (epoch seconds) from a JWT-shaped token.
pub fn decode_expiry(token: &str) -> Result<i64, ClaimsError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ClaimsError::Segments(segments.len()));
    }
    let payload = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| ClaimsError::Base64(e.to_string()))?;
    let claims: Value = serde_json::from_slice(&payload).map_err(|e| ClaimsError::Json(e.to_string()))?;
    expiry_from(&claims).ok_or(ClaimsError::MissingExpiry)
}

#[allow(clippy::cast_possible_truncation)]
fn expiry_from(claims: &Value) -> Option<i64> {
    let exp = claims.get("exp")?;
    if let Some(secs) = exp.as_i64() {
        return Some(secs);
    }
    // Round up: a fractional `exp` after `now` still counts as unexpired.
    exp.as_f64().filter(|f| f.is_finite()).map(|f| f.ceil() as i64)
}
