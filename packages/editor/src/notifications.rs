//! Transient success/error banners
//!
//! Every operation that can fail reports through here. A notification stays
//! active for a fixed time-to-live and is then dropped; subscribers also get
//! each one as it is raised.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub raised_at: Instant,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    active: Mutex<Vec<Notification>>,
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            ttl,
            active: Mutex::new(Vec::new()),
            tx,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn success(&self, message: impl Into<String>) {
        self.raise(NotificationKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.raise(NotificationKind::Error, message.into());
    }

    /// Notifications that have not yet expired, oldest first
    pub fn active(&self) -> Vec<Notification> {
        let mut active = self.active.lock();
        self.prune(&mut active);
        active.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    fn raise(&self, kind: NotificationKind, message: String) {
        let notification = Notification {
            kind,
            message,
            raised_at: Instant::now(),
        };

        match kind {
            NotificationKind::Success => tracing::info!(message = %notification.message, "notify"),
            NotificationKind::Error => tracing::warn!(message = %notification.message, "notify"),
        }

        {
            let mut active = self.active.lock();
            self.prune(&mut active);
            active.push(notification.clone());
        }

        // No subscribers is fine
        let _ = self.tx.send(notification);
    }

    fn prune(&self, active: &mut Vec<Notification>) {
        let now = Instant::now();
        active.retain(|n| now.duration_since(n.raised_at) < self.ttl);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}
