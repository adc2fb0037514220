//! User-facing notices and navigation requests.
//!
//! SYSTEM CONTEXT
//! ==============
//! The request pipeline and the client report outcomes through these traits
//! instead of talking to a UI directly. The CLI prints notices; tests record
//! them.

use crate::views::View;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }
}

/// Shows a notice to the user (a toast, a stderr line, ...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Moves the user to another view.
pub trait Navigator: Send + Sync {
    fn redirect(&self, view: View);
}

/// Logs notices instead of displaying them.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            Level::Success => tracing::info!(message = %notice.message, "notice"),
            Level::Error => tracing::warn!(message = %notice.message, "notice"),
        }
    }
}

/// Records the redirect in the log; for hosts without views.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn redirect(&self, view: View) {
        tracing::info!(%view, "redirect");
    }
}
