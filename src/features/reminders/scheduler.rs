//! # Feature: Reminder Scheduler
//!
//! One-shot reminders fired `lead` before an appointment starts. Each armed
//! reminder is a tokio task sleeping until its fire time; handles live in an
//! arena keyed by appointment id, never inside the appointment itself.
//!
//! Arena changes only happen while the caller holds the store lock (every
//! mutating method takes `&mut AppointmentStore`). A firing task takes the
//! same lock and checks that its token is still the registered one, so a
//! remove, rearm or disarm that got there first turns it into a no-op.
//!
//! Must be used from within a tokio runtime.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.0.0: Arm, rearm, disarm and shutdown over a DashMap handle arena

use chrono::{Duration, NaiveDateTime};
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::{format_lead_time, Clock, PlannerError, PlannerResult};
use crate::features::appointments::{AppointmentId, AppointmentStore, ReminderState};
use crate::features::notifications::{Notification, NotificationChannel};

/// Store guarded by the single mutual-exclusion boundary
pub type SharedStore = Arc<Mutex<AppointmentStore>>;

/// Pending deferred action for one appointment
struct ReminderHandle {
    token: Uuid,
    fire_at: NaiveDateTime,
    lead: Duration,
    task: JoinHandle<()>,
}

/// Snapshot of a pending reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReminder {
    pub fire_at: NaiveDateTime,
    pub lead: Duration,
}

/// Compute `start - lead`, refusing fire times that are not in the future.
///
/// A fire time outside chrono's range is reported as past due.
pub fn fire_time(
    start: NaiveDateTime,
    lead: Duration,
    now: NaiveDateTime,
) -> PlannerResult<NaiveDateTime> {
    match start.checked_sub_signed(lead) {
        Some(fire_at) if fire_at > now => Ok(fire_at),
        fire_at => Err(PlannerError::ReminderPastDue { fire_at }),
    }
}

#[derive(Clone)]
pub struct ReminderScheduler {
    store: SharedStore,
    channel: NotificationChannel,
    clock: Arc<dyn Clock>,
    handles: Arc<DashMap<AppointmentId, ReminderHandle>>,
}

impl ReminderScheduler {
    pub fn new(store: SharedStore, channel: NotificationChannel, clock: Arc<dyn Clock>) -> Self {
        ReminderScheduler {
            store,
            channel,
            clock,
            handles: Arc::new(DashMap::new()),
        }
    }

    /// Schedule a reminder `lead` before the appointment's start
    pub fn arm(
        &self,
        store: &mut AppointmentStore,
        id: AppointmentId,
        lead: Duration,
    ) -> PlannerResult<NaiveDateTime> {
        match self.schedule(store, id, lead) {
            Ok(fire_at) => {
                self.channel.publish(Notification::info(
                    Some(id),
                    format!(
                        "Meeting reminder set for {fire_at} ({} before start)",
                        format_lead_time(lead)
                    ),
                ));
                Ok(fire_at)
            }
            Err(e) => {
                self.channel.publish(Notification::rejected(
                    Some(id),
                    format!("Reminder cannot be set: {e}"),
                ));
                Err(e)
            }
        }
    }

    /// Replace the pending reminder with one using `lead`
    pub fn rearm(
        &self,
        store: &mut AppointmentStore,
        id: AppointmentId,
        lead: Duration,
    ) -> PlannerResult<NaiveDateTime> {
        match self.schedule(store, id, lead) {
            Ok(fire_at) => {
                self.channel.publish(Notification::info(
                    Some(id),
                    format!(
                        "Meeting reminder changed to {fire_at} ({} before start)",
                        format_lead_time(lead)
                    ),
                ));
                Ok(fire_at)
            }
            Err(e) => {
                self.channel.publish(Notification::rejected(
                    Some(id),
                    format!("Reminder cannot be changed: {e}"),
                ));
                Err(e)
            }
        }
    }

    /// Cancel the pending reminder, if any.
    ///
    /// Returns whether something was cancelled. Nothing pending is a no-op.
    pub fn disarm(&self, store: &mut AppointmentStore, id: AppointmentId) -> PlannerResult<bool> {
        if store.get(id).is_none() {
            self.channel.publish(Notification::rejected(
                Some(id),
                format!("Reminder cannot be cancelled: {}", PlannerError::NotFound),
            ));
            return Err(PlannerError::NotFound);
        }
        if !self.cancel(id) {
            debug!("Disarm for {id}: nothing pending");
            return Ok(false);
        }
        store.set_reminder_state(id, ReminderState::Cancelled)?;
        self.channel.publish(Notification::info(
            Some(id),
            "There will be no reminder for this meeting",
        ));
        Ok(true)
    }

    /// Abort the pending action without touching the appointment's state.
    ///
    /// Used when the appointment itself is going away.
    pub fn cancel(&self, id: AppointmentId) -> bool {
        match self.handles.remove(&id) {
            Some((_, handle)) => {
                handle.task.abort();
                debug!("Cancelled reminder for {id} due at {}", handle.fire_at);
                true
            }
            None => false,
        }
    }

    /// Disarm every pending reminder; returns how many were cancelled
    pub fn disarm_all(&self, store: &mut AppointmentStore) -> usize {
        let ids: Vec<AppointmentId> = self.handles.iter().map(|entry| *entry.key()).collect();
        let mut cancelled = 0;
        for id in ids {
            if self.cancel(id) {
                cancelled += 1;
                if store.set_reminder_state(id, ReminderState::Cancelled).is_err() {
                    warn!("Cancelled reminder for {id}, which is no longer in the store");
                }
            }
        }
        if cancelled > 0 {
            info!("Disarmed {cancelled} pending reminder(s)");
        }
        cancelled
    }

    pub fn pending(&self, id: AppointmentId) -> Option<PendingReminder> {
        self.handles.get(&id).map(|h| PendingReminder {
            fire_at: h.fire_at,
            lead: h.lead,
        })
    }

    pub fn is_pending(&self, id: AppointmentId) -> bool {
        self.handles.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.handles.len()
    }

    /// Validate, replace any existing action, spawn the new one
    fn schedule(
        &self,
        store: &mut AppointmentStore,
        id: AppointmentId,
        lead: Duration,
    ) -> PlannerResult<NaiveDateTime> {
        let appointment = store.get(id).ok_or(PlannerError::NotFound)?;
        let now = self.clock.now();
        let fire_at = fire_time(appointment.start(), lead, now)?;

        self.cancel(id);

        let token = Uuid::new_v4();
        let delay = (fire_at - now).to_std().unwrap_or_default();
        let scheduler = self.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.fire(id, token).await;
        });

        self.handles.insert(
            id,
            ReminderHandle {
                token,
                fire_at,
                lead,
                task,
            },
        );
        store.set_reminder_state(id, ReminderState::Scheduled { fire_at, lead })?;

        info!(
            "Reminder for {id} scheduled at {fire_at} ({} before start)",
            format_lead_time(lead)
        );
        Ok(fire_at)
    }

    async fn fire(&self, id: AppointmentId, token: Uuid) {
        let mut store = self.store.lock().await;

        let current = self
            .handles
            .get(&id)
            .map(|h| h.token == token)
            .unwrap_or(false);
        if !current {
            debug!("Stale reminder task for {id} woke up, ignoring");
            return;
        }
        self.handles.remove(&id);

        let notification = match store.get(id) {
            Some(a) => Notification::reminder(id, a.start(), a.end(), a.title()),
            None => {
                warn!("Reminder for {id} fired after the appointment was removed");
                return;
            }
        };
        if let Err(e) = store.set_reminder_state(id, ReminderState::Fired) {
            warn!("Failed to mark reminder for {id} as fired: {e}");
        }
        drop(store);

        info!("Reminder fired for {id}");
        self.channel.publish(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::features::notifications::NotificationKind;
    use chrono::NaiveDate;
    use std::sync::Mutex as StdMutex;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    struct Fixture {
        store: SharedStore,
        scheduler: ReminderScheduler,
        seen: Arc<StdMutex<Vec<Notification>>>,
    }

    fn fixture() -> Fixture {
        let store: SharedStore = Arc::new(Mutex::new(AppointmentStore::new()));
        let channel = NotificationChannel::default();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        channel.subscribe(move |n| sink.lock().unwrap().push(n.clone()));
        let clock = Arc::new(ManualClock::new(base()));
        let scheduler = ReminderScheduler::new(store.clone(), channel, clock);
        Fixture {
            store,
            scheduler,
            seen,
        }
    }

    async fn add(store: &SharedStore, start: NaiveDateTime) -> AppointmentId {
        let mut guard = store.lock().await;
        let a = guard.create(start, start + Duration::hours(1), "Review");
        let id = a.id();
        guard.insert(a);
        id
    }

    fn reminders(seen: &Arc<StdMutex<Vec<Notification>>>) -> usize {
        seen.lock()
            .unwrap()
            .iter()
            .filter(|n| n.kind == NotificationKind::Reminder)
            .count()
    }

    #[test]
    fn test_fire_time() {
        let start = base() + Duration::hours(1);
        assert_eq!(
            fire_time(start, Duration::minutes(15), base()),
            Ok(start - Duration::minutes(15))
        );
        assert!(matches!(
            fire_time(base() + Duration::minutes(10), Duration::minutes(15), base()),
            Err(PlannerError::ReminderPastDue { .. })
        ));
        // Exactly now is not in the future
        assert!(fire_time(base() + Duration::minutes(15), Duration::minutes(15), base()).is_err());
    }

    #[test]
    fn test_fire_time_out_of_range_is_past_due() {
        assert_eq!(
            fire_time(base(), Duration::days(100_000_000), base()),
            Err(PlannerError::ReminderPastDue { fire_at: None })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_with_huge_lead_is_rejected() {
        let f = fixture();
        let id = add(&f.store, base() + Duration::hours(1)).await;

        let mut store = f.store.lock().await;
        let lead = crate::core::parse_lead_time("100000000d").unwrap();
        assert_eq!(
            f.scheduler.arm(&mut store, id, lead),
            Err(PlannerError::ReminderPastDue { fire_at: None })
        );
        assert_eq!(store.get(id).unwrap().reminder(), ReminderState::None);
        assert_eq!(f.scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_rejects_past_due_and_keeps_state() {
        let f = fixture();
        let soon = add(&f.store, base() + Duration::minutes(10)).await;

        let mut store = f.store.lock().await;
        let err = f.scheduler.arm(&mut store, soon, Duration::minutes(15));
        assert!(matches!(err, Err(PlannerError::ReminderPastDue { .. })));
        assert_eq!(store.get(soon).unwrap().reminder(), ReminderState::None);
        assert_eq!(f.scheduler.pending_count(), 0);
        drop(store);

        let last = f.seen.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.kind, NotificationKind::Rejected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_rearm_keeps_previous_reminder() {
        let f = fixture();
        let id = add(&f.store, base() + Duration::hours(1)).await;

        let mut store = f.store.lock().await;
        let fire_at = f.scheduler.arm(&mut store, id, Duration::minutes(15)).unwrap();
        assert!(f.scheduler.rearm(&mut store, id, Duration::hours(2)).is_err());

        assert_eq!(
            f.scheduler.pending(id),
            Some(PendingReminder {
                fire_at,
                lead: Duration::minutes(15)
            })
        );
        assert_eq!(
            store.get(id).unwrap().reminder(),
            ReminderState::Scheduled {
                fire_at,
                lead: Duration::minutes(15)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_fires_once_at_fire_time() {
        let f = fixture();
        let id = add(&f.store, base() + Duration::hours(1)).await;

        let fire_at = {
            let mut store = f.store.lock().await;
            f.scheduler.arm(&mut store, id, Duration::minutes(15)).unwrap()
        };
        assert_eq!(fire_at, base() + Duration::minutes(45));

        tokio::time::sleep(std::time::Duration::from_secs(44 * 60)).await;
        assert_eq!(reminders(&f.seen), 0);

        tokio::time::sleep(std::time::Duration::from_secs(2 * 60)).await;
        assert_eq!(reminders(&f.seen), 1);
        assert_eq!(f.scheduler.pending_count(), 0);
        assert_eq!(
            f.store.lock().await.get(id).unwrap().reminder(),
            ReminderState::Fired
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_rather_than_stacks() {
        let f = fixture();
        let id = add(&f.store, base() + Duration::hours(2)).await;

        {
            let mut store = f.store.lock().await;
            f.scheduler.arm(&mut store, id, Duration::minutes(15)).unwrap();
            f.scheduler.rearm(&mut store, id, Duration::hours(1)).unwrap();
            // Arming again also replaces
            f.scheduler.arm(&mut store, id, Duration::minutes(30)).unwrap();
            f.scheduler.rearm(&mut store, id, Duration::hours(1)).unwrap();
        }

        assert_eq!(f.scheduler.pending_count(), 1);
        assert_eq!(f.scheduler.pending(id).unwrap().lead, Duration::hours(1));

        tokio::time::sleep(std::time::Duration::from_secs(3 * 3600)).await;
        assert_eq!(reminders(&f.seen), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_is_idempotent() {
        let f = fixture();
        let id = add(&f.store, base() + Duration::hours(1)).await;

        {
            let mut store = f.store.lock().await;
            assert_eq!(f.scheduler.disarm(&mut store, id), Ok(false));
            assert_eq!(store.get(id).unwrap().reminder(), ReminderState::None);

            f.scheduler.arm(&mut store, id, Duration::minutes(15)).unwrap();
            assert_eq!(f.scheduler.disarm(&mut store, id), Ok(true));
            assert_eq!(f.scheduler.disarm(&mut store, id), Ok(false));
            assert_eq!(store.get(id).unwrap().reminder(), ReminderState::Cancelled);
            assert_eq!(
                f.scheduler.disarm(&mut store, AppointmentId::new()),
                Err(PlannerError::NotFound)
            );
        }

        tokio::time::sleep(std::time::Duration::from_secs(2 * 3600)).await;
        assert_eq!(reminders(&f.seen), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_then_remove_never_fires() {
        let f = fixture();
        let id = add(&f.store, base() + Duration::hours(1)).await;

        {
            let mut store = f.store.lock().await;
            f.scheduler.arm(&mut store, id, Duration::minutes(15)).unwrap();
            assert!(f.scheduler.cancel(id));
            store.remove(id).unwrap();
        }

        tokio::time::sleep(std::time::Duration::from_secs(2 * 3600)).await;
        assert_eq!(reminders(&f.seen), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_all() {
        let f = fixture();
        let a = add(&f.store, base() + Duration::hours(1)).await;
        let b = add(&f.store, base() + Duration::hours(3)).await;

        let mut store = f.store.lock().await;
        f.scheduler.arm(&mut store, a, Duration::minutes(15)).unwrap();
        f.scheduler.arm(&mut store, b, Duration::minutes(15)).unwrap();

        assert_eq!(f.scheduler.disarm_all(&mut store), 2);
        assert_eq!(f.scheduler.pending_count(), 0);
        assert_eq!(store.get(a).unwrap().reminder(), ReminderState::Cancelled);
        assert_eq!(store.get(b).unwrap().reminder(), ReminderState::Cancelled);
    }
}
