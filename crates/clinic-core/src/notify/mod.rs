//! User notification layer
//!
//! Every recoverable failure and every completed mutation talks to the
//! user through a single shared [`Notifier`]. The browsers and services
//! push notifications; the UI drains them once per frame and renders
//! them as toasts.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of undelivered notifications kept in the buffer
const MAX_PENDING: usize = 64;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A single user-facing message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Shared sink for user notifications
///
/// Cheap to clone; all clones push into the same buffer. Access is
/// guarded by a mutex only because the render loop and the fetch
/// completions both touch it - there is no cross-thread contention in
/// the single-threaded UI.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    pending: Arc<Mutex<VecDeque<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Notification::new(Level::Info, message));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Notification::new(Level::Success, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Notification::new(Level::Error, message));
    }

    pub fn push(&self, notification: Notification) {
        let mut pending = self.pending.lock().expect("notifier lock poisoned");
        if pending.len() == MAX_PENDING {
            pending.pop_front();
        }
        pending.push_back(notification);
    }

    /// Take all undelivered notifications, oldest first
    pub fn drain(&self) -> Vec<Notification> {
        let mut pending = self.pending.lock().expect("notifier lock poisoned");
        pending.drain(..).collect()
    }

    /// Number of undelivered notifications
    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("notifier lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_notifications_in_order() {
        let notifier = Notifier::new();
        notifier.info("first");
        notifier.error("second");

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[0].level, Level::Info);
        assert_eq!(drained[1].message, "second");
        assert_eq!(drained[1].level, Level::Error);
        assert_eq!(notifier.pending_count(), 0);
    }

    #[test]
    fn clones_share_the_same_buffer() {
        let notifier = Notifier::new();
        let clone = notifier.clone();
        clone.success("saved");
        assert_eq!(notifier.pending_count(), 1);
    }

    #[test]
    fn buffer_drops_oldest_when_full() {
        let notifier = Notifier::new();
        for i in 0..(MAX_PENDING + 5) {
            notifier.info(format!("message {i}"));
        }
        let drained = notifier.drain();
        assert_eq!(drained.len(), MAX_PENDING);
        assert_eq!(drained[0].message, "message 5");
    }
}
