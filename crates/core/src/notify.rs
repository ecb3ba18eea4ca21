//! The user-facing notification side channel.
//!
//! Every failed adapter operation produces exactly one notification (one per
//! offending field for field-level validation); every successful mutation
//! produces exactly one; successful reads are silent. How notifications are
//! *presented* (toasts in the original console) is out of scope — this
//! module only defines the channel and two sinks: one that routes through
//! `tracing`, and one that buffers for tests and batch surfaces.

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "ok",
            Self::Error => "error",
        })
    }
}

/// A short human-readable message destined for the console user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notify: Send + Sync {
    fn push(&self, notification: Notification);
}

/// Routes notifications into the diagnostic log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notify for LogNotifier {
    fn push(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => tracing::info!(message = %notification.message, "notification"),
            Severity::Error => tracing::error!(message = %notification.message, "notification"),
        }
    }
}

/// Collects notifications in memory.
///
/// Used by the test suites to assert the exactly-one-notification rules, and
/// available to callers that want to hand messages back to a UI in batch.
#[derive(Debug, Default)]
pub struct BufferedNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl BufferedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything collected so far.
    pub fn drain(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notify for BufferedNotifier {
    fn push(&self, notification: Notification) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_notifier_collects_and_drains() {
        let notifier = BufferedNotifier::new();
        notifier.push(Notification::success("Patient created successfully"));
        notifier.push(Notification::error("Failed to fetch patients"));

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].severity, Severity::Success);
        assert_eq!(drained[1].severity, Severity::Error);

        assert!(notifier.drain().is_empty(), "drain empties the buffer");
    }
}
