//! # Notification Bus — in-process fan-out for domain notifications
//!
//! Audit-change notifications flow through here on their way to whatever
//! delivery channels the deployment wires up (webhooks, mail, consoles).
//! The bus owns routing and bookkeeping only; callers decide *whether* a
//! notification is warranted, delivery is a subscriber concern.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum notifications retained in the recent log before pruning.
const MAX_NOTIFICATION_LOG: usize = 10_000;
/// Maximum subscribers.
const MAX_SUBSCRIBERS: usize = 128;

/// Visibility scope of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NotificationScope {
    /// Portfolio-wide: visible to anything watching the whole instance.
    Portfolio,
    /// System-internal (health, configuration).
    System,
}

/// Routing group — subscribers filter on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NotificationGroup {
    /// An audit decision changed on a subject scoped to one project.
    ProjectAuditChange,
    /// An audit decision changed on a subject with no project scope.
    GlobalAuditChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum NotificationLevel {
    Informational,
    Warning,
    Error,
}

/// A domain notification. `project` carries the affected project scope when
/// the triggering subject had one.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Notification {
    pub id: u64,
    pub timestamp_ms: i64,
    pub scope: NotificationScope,
    pub group: NotificationGroup,
    pub level: NotificationLevel,
    pub title: String,
    pub content: String,
    pub project: Option<String>,
}

pub type NotifyFn = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Subscription {
    id: u64,
    name: String,
    filter_group: Option<NotificationGroup>,
    callback: NotifyFn,
}

/// In-process publish/subscribe bus for domain notifications.
pub struct NotificationBus {
    subscriptions: RwLock<Vec<Subscription>>,
    /// Recent notification log, pruned oldest-first.
    log: RwLock<Vec<Notification>>,
    next_id: AtomicU64,
    next_sub_id: AtomicU64,
    total_published: AtomicU64,
    total_delivered: AtomicU64,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            log: RwLock::new(Vec::with_capacity(256)),
            next_id: AtomicU64::new(1),
            next_sub_id: AtomicU64::new(1),
            total_published: AtomicU64::new(0),
            total_delivered: AtomicU64::new(0),
        }
    }

    /// Publish a notification. Returns the assigned ID.
    pub fn publish(&self, mut notification: Notification) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        notification.id = id;
        if notification.timestamp_ms == 0 {
            notification.timestamp_ms = chrono::Utc::now().timestamp_millis();
        }
        self.total_published.fetch_add(1, Ordering::Relaxed);

        debug!(
            id = id,
            group = ?notification.group,
            title = %notification.title,
            "Notification published"
        );

        let subs = self.subscriptions.read();
        for sub in subs.iter() {
            if sub.filter_group.map_or(true, |g| g == notification.group) {
                (sub.callback)(&notification);
                self.total_delivered.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut log = self.log.write();
        if log.len() >= MAX_NOTIFICATION_LOG {
            let drain_count = MAX_NOTIFICATION_LOG / 10;
            log.drain(..drain_count);
        }
        log.push(notification);

        id
    }

    /// Subscribe to notifications, optionally filtered by group. Returns a
    /// subscription ID for later unsubscribe.
    pub fn subscribe(
        &self,
        name: &str,
        filter_group: Option<NotificationGroup>,
        callback: NotifyFn,
    ) -> u64 {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let mut subs = self.subscriptions.write();
        if subs.len() >= MAX_SUBSCRIBERS {
            warn!(name = %name, "Max subscribers reached, dropping oldest");
            subs.remove(0);
        }
        subs.push(Subscription {
            id,
            name: name.into(),
            filter_group,
            callback,
        });
        id
    }

    pub fn unsubscribe(&self, sub_id: u64) -> bool {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|s| s.id != sub_id);
        subs.len() < before
    }

    /// Most recent notifications (up to `limit`), newest first.
    pub fn recent(&self, limit: usize, group: Option<NotificationGroup>) -> Vec<Notification> {
        let log = self.log.read();
        log.iter()
            .rev()
            .filter(|n| group.map_or(true, |g| n.group == g))
            .take(limit)
            .cloned()
            .collect()
    }

    // ── Stats ────────────────────────────────────────────────────────────

    pub fn total_published(&self) -> u64 { self.total_published.load(Ordering::Relaxed) }
    pub fn total_delivered(&self) -> u64 { self.total_delivered.load(Ordering::Relaxed) }
    pub fn log_size(&self) -> usize { self.log.read().len() }
    pub fn subscriber_count(&self) -> usize { self.subscriptions.read().len() }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
