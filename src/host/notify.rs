//! Best-effort toast notifications.

use parking_lot::Mutex;
use tracing::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// User-facing toast surface. Implementations must never fail loudly.
pub trait Notifier: Send + Sync {
    fn info(&self, title: &str, message: &str);
    fn success(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
}

/// Writes toasts to the log instead of a screen.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, title: &str, message: &str) {
        info!(event_type = "toast", kind = "info", title, "{}", message);
    }

    fn success(&self, title: &str, message: &str) {
        info!(event_type = "toast", kind = "success", title, "{}", message);
    }

    fn error(&self, title: &str, message: &str) {
        error!(event_type = "toast", kind = "error", title, "{}", message);
    }
}

/// A toast captured by [`RecordingNotifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

/// Keeps every toast in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    pub fn count(&self, kind: ToastKind) -> usize {
        self.toasts.lock().iter().filter(|t| t.kind == kind).count()
    }

    pub fn clear(&self) {
        self.toasts.lock().clear();
    }

    fn push(&self, kind: ToastKind, title: &str, message: &str) {
        self.toasts.lock().push(Toast {
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, title: &str, message: &str) {
        self.push(ToastKind::Info, title, message);
    }

    fn success(&self, title: &str, message: &str) {
        self.push(ToastKind::Success, title, message);
    }

    fn error(&self, title: &str, message: &str) {
        self.push(ToastKind::Error, title, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_counts_by_kind() {
        let notifier = RecordingNotifier::new();
        notifier.success("Saved", "one");
        notifier.success("Saved", "two");
        notifier.error("Failed", "three");

        assert_eq!(notifier.count(ToastKind::Success), 2);
        assert_eq!(notifier.count(ToastKind::Error), 1);
        assert_eq!(notifier.toasts()[2].message, "three");

        notifier.clear();
        assert!(notifier.toasts().is_empty());
    }
}
