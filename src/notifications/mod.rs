//! Transient user notifications.
//!
//! Every flow reports its outcome here instead of printing directly. A
//! notification stays visible for the configured time-to-live; `Alert`
//! notifications stand in for blocking dialogs and are shown until drained.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
    /// Blocking message the user has to acknowledge
    Alert,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
            NotificationKind::Alert => "alert",
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, NotificationKind::Alert)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether a non-blocking notification has outlived `ttl` at `now`
    pub fn is_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        if self.kind.is_blocking() {
            return false;
        }
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        now - self.created_at >= ttl
    }
}

/// Shared notification queue; clones see the same queue
#[derive(Debug, Clone)]
pub struct Notifier {
    queue: Arc<Mutex<VecDeque<Notification>>>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            ttl,
        }
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        let message = message.into();
        match kind {
            NotificationKind::Error | NotificationKind::Alert => {
                warn!(kind = kind.as_str(), %message, "Notification")
            }
            _ => info!(kind = kind.as_str(), %message, "Notification"),
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message,
            created_at: Utc::now(),
        };
        let id = notification.id;
        self.queue.lock().push_back(notification);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Success, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Info, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Error, message)
    }

    pub fn alert(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Alert, message)
    }

    /// Notifications still visible now
    pub fn visible(&self) -> Vec<Notification> {
        let now = Utc::now();
        let mut queue = self.queue.lock();
        queue.retain(|n| !n.is_expired_at(self.ttl, now));
        queue.iter().cloned().collect()
    }

    /// Take every queued notification, expired or not
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.lock().drain(..).collect()
    }

    pub fn dismiss(&self, id: Uuid) {
        self.queue.lock().retain(|n| n.id != id);
    }

    /// Most recent notification, if any
    pub fn last(&self) -> Option<Notification> {
        self.queue.lock().back().cloned()
    }

    /// Message of the most recent notification of `kind`
    pub fn last_message(&self, kind: NotificationKind) -> Option<String> {
        self.queue
            .lock()
            .iter()
            .rev()
            .find(|n| n.kind == kind)
            .map(|n| n.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_and_drain() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.success("Saved");
        notifier.alert("Failed to update request");

        assert_eq!(notifier.last().unwrap().kind, NotificationKind::Alert);
        assert_eq!(
            notifier.last_message(NotificationKind::Success).as_deref(),
            Some("Saved")
        );

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert!(notifier.drain().is_empty());
    }

    #[test]
    fn test_expiry_skips_alerts() {
        let notifier = Notifier::new(Duration::ZERO);
        notifier.info("gone");
        notifier.alert("stays");
        let visible = notifier.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "stays");
    }

    #[test]
    fn test_expiry_at() {
        let n = Notification {
            id: Uuid::new_v4(),
            kind: NotificationKind::Success,
            message: "x".to_string(),
            created_at: Utc::now(),
        };
        let ttl = Duration::from_secs(3);
        assert!(!n.is_expired_at(ttl, n.created_at + chrono::Duration::seconds(2)));
        assert!(n.is_expired_at(ttl, n.created_at + chrono::Duration::seconds(3)));
    }

    #[test]
    fn test_clones_share_queue() {
        let notifier = Notifier::new(Duration::from_secs(3));
        let other = notifier.clone();
        let id = other.error("boom");
        assert_eq!(notifier.last().unwrap().id, id);
        notifier.dismiss(id);
        assert!(other.last().is_none());
    }
}
