//! User-visible notifications and clipboard access.
//!
//! Front-ends plug in their own toast and clipboard implementations; the
//! default notifier just logs.

use tracing::{error, info};

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Sink for transient user notifications ("toasts").
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: ToastKind, message: &str);

    fn success(&self, message: &str) {
        self.notify(ToastKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(ToastKind::Error, message);
    }
}

/// Notifier that writes every toast to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: ToastKind, message: &str) {
        match kind {
            ToastKind::Success => info!(toast = "success", "{message}"),
            ToastKind::Error => error!(toast = "error", "{message}"),
        }
    }
}

/// Clipboard write access.
pub trait Clipboard: Send + Sync {
    /// Copy `text`. Returns `false` when no clipboard is available.
    fn write_text(&self, text: &str) -> bool;
}
