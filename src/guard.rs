//! Route guard for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs on every navigation to a protected view. The decision itself
//! (`evaluate`) is a pure function of token, session flag and clock; the guard
//! only applies the session reset the decision asks for. Redirecting is left
//! to the caller so the logic is testable without a UI.
//!
//! A malformed token and an expired token are the same thing to callers:
//! both invalidate the session.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::Arc;

use crate::claims::decode_expiry;
use crate::state::session::SessionState;
use crate::views::View;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// No token in storage.
    MissingToken,
    /// A token exists but login never completed in this session.
    NotAuthenticated,
    /// The token is expired or cannot be decoded.
    InvalidToken,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Verdict::Allow
    }

    /// Where a denied navigation should land.
    #[must_use]
    pub fn redirect(self) -> Option<View> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(_) => Some(View::Root),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    /// Whether the session (and token) must be reset before redirecting.
    pub reset_session: bool,
}

impl Decision {
    fn allow() -> Self {
        Self { verdict: Verdict::Allow, reset_session: false }
    }

    fn deny(reason: DenyReason, reset_session: bool) -> Self {
        Self { verdict: Verdict::Deny(reason), reset_session }
    }
}

/// Decide access for a protected view. `now` is epoch seconds.
#[must_use]
pub fn evaluate(token: Option<&str>, is_authenticated: bool, now: i64) -> Decision {
    let Some(token) = token else {
        return Decision::deny(DenyReason::MissingToken, true);
    };
    // The token is deliberately left in place here.
    if !is_authenticated {
        return Decision::deny(DenyReason::NotAuthenticated, false);
    }
    match decode_expiry(token) {
        Ok(exp) if exp > now => Decision::allow(),
        Ok(_) => Decision::deny(DenyReason::InvalidToken, true),
        Err(e) => {
            tracing::debug!(error = %e, "token claims undecodable");
            Decision::deny(DenyReason::InvalidToken, true)
        }
    }
}

#[must_use]
pub fn now_epoch_secs() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[derive(Clone, Debug)]
pub struct AuthGuard {
    session: Arc<SessionState>,
}

impl AuthGuard {
    #[must_use]
    pub fn new(session: Arc<SessionState>) -> Self {
        Self { session }
    }

    /// Check access to `view` against the current clock.
    pub fn check(&self, view: View) -> Verdict {
        self.check_at(view, now_epoch_secs())
    }

    /// Check access to `view` as of `now` (epoch seconds).
    pub fn check_at(&self, view: View, now: i64) -> Verdict {
        if !view.is_protected() {
            return Verdict::Allow;
        }
        let token = self.session.tokens().read();
        let decision = evaluate(token.as_deref(), self.session.is_authenticated(), now);
        if decision.reset_session {
            if let Err(e) = self.session.reset() {
                tracing::warn!(error = %e, "session reset incomplete");
            }
        }
        if let Verdict::Deny(reason) = decision.verdict {
            tracing::info!(view = %view, ?reason, "access denied");
        }
        decision.verdict
    }
}
