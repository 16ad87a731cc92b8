//! # Feature: Notification Channel
//!
//! Process-wide broadcast of human-readable status messages. Components
//! publish; the presenter (console, log, tests) subscribes. Delivery to
//! callbacks is synchronous and in publish order; nothing is replayed to
//! late subscribers.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Callback subscribers plus tokio broadcast receivers for async consumers

use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::core::config::DEFAULT_NOTIFICATION_CAPACITY;
use crate::features::appointments::AppointmentId;

/// Category of a published message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An operation succeeded
    Info,
    /// An operation was refused
    Rejected,
    /// A reminder fired
    Reminder,
}

/// One status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<AppointmentId>,
    pub message: String,
}

impl Notification {
    pub fn info(appointment: Option<AppointmentId>, message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Info,
            appointment,
            message: message.into(),
        }
    }

    pub fn rejected(appointment: Option<AppointmentId>, message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Rejected,
            appointment,
            message: message.into(),
        }
    }

    pub fn reminder(
        appointment: AppointmentId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: &str,
    ) -> Self {
        Notification {
            kind: NotificationKind::Reminder,
            appointment: Some(appointment),
            message: format!(
                "Meeting reminder: {} - {}: {}",
                start.format("%H:%M:%S"),
                end.format("%H:%M:%S"),
                title
            ),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Handle returned by [`NotificationChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Cheaply cloneable publish/subscribe channel
#[derive(Clone)]
pub struct NotificationChannel {
    subscribers: Arc<RwLock<Vec<(SubscriptionId, Callback)>>>,
    /// Broadcast sender for async receivers
    event_tx: broadcast::Sender<Notification>,
    next_id: Arc<AtomicU64>,
}

impl NotificationChannel {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        NotificationChannel {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            event_tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Deliver to every currently registered subscriber
    pub fn publish(&self, notification: Notification) {
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(json) = serde_json::to_string(&notification) {
                debug!("notification {json}");
            }
        }

        // Snapshot so a callback may subscribe/unsubscribe without deadlocking
        let callbacks: Vec<Callback> = match self.subscribers.read() {
            Ok(subs) => subs.iter().map(|(_, cb)| cb.clone()).collect(),
            Err(poisoned) => poisoned.into_inner().iter().map(|(_, cb)| cb.clone()).collect(),
        };
        for callback in callbacks {
            callback(&notification);
        }

        // No receivers is not an error
        let _ = self.event_tx.send(notification);
    }

    /// Register a callback for all future messages
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: Callback = Arc::new(callback);
        let mut subs = match self.subscribers.write() {
            Ok(subs) => subs,
            Err(poisoned) => poisoned.into_inner(),
        };
        subs.push((id, callback));
        id
    }

    /// Returns false when the id was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = match self.subscribers.write() {
            Ok(subs) => subs,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        if subs.len() == before {
            warn!("Unsubscribe for unknown subscription {}", id.0);
            false
        } else {
            true
        }
    }

    /// Async receiver of future messages; a slow receiver may lag and lose some
    pub fn receiver(&self) -> broadcast::Receiver<Notification> {
        self.event_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collector(channel: &NotificationChannel) -> (SubscriptionId, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = channel.subscribe(move |n| sink.lock().unwrap().push(n.message.clone()));
        (id, seen)
    }

    #[test]
    fn test_delivers_in_publish_order() {
        let channel = NotificationChannel::default();
        let (_, seen) = collector(&channel);

        channel.publish(Notification::info(None, "one"));
        channel.publish(Notification::rejected(None, "two"));

        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_late_subscriber_sees_no_replay() {
        let channel = NotificationChannel::default();
        channel.publish(Notification::info(None, "early"));

        let (_, seen) = collector(&channel);
        channel.publish(Notification::info(None, "late"));

        assert_eq!(*seen.lock().unwrap(), vec!["late"]);
    }

    #[test]
    fn test_fan_out_and_unsubscribe() {
        let channel = NotificationChannel::default();
        let (first, seen_a) = collector(&channel);
        let (_, seen_b) = collector(&channel);
        assert_eq!(channel.subscriber_count(), 2);

        channel.publish(Notification::info(None, "both"));
        assert!(channel.unsubscribe(first));
        assert!(!channel.unsubscribe(first));
        channel.publish(Notification::info(None, "only b"));

        assert_eq!(*seen_a.lock().unwrap(), vec!["both"]);
        assert_eq!(*seen_b.lock().unwrap(), vec!["both", "only b"]);
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let channel = NotificationChannel::new(1);
        channel.publish(Notification::info(None, "nobody listening"));
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let channel = NotificationChannel::default();
        let mut rx = channel.receiver();

        channel.publish(Notification::info(None, "tick"));

        let received = rx.recv().await.expect("notification");
        assert_eq!(received.kind, NotificationKind::Info);
        assert_eq!(received.message, "tick");
    }

    #[test]
    fn test_reminder_message_format() {
        let start = chrono::NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let n = Notification::reminder(
            AppointmentId::new(),
            start,
            start + chrono::Duration::hours(1),
            "Review",
        );
        assert_eq!(n.kind, NotificationKind::Reminder);
        assert_eq!(n.message, "Meeting reminder: 10:00:00 - 11:00:00: Review");
    }
}
