//! # Planner
//!
//! Orchestrates the appointment flow: validate, commit, then arm, rearm or
//! disarm the reminder. Every accepted or rejected step publishes one
//! message on the notification channel. Rejections leave the store and the
//! reminder schedule exactly as they were.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Create/edit/remove, reminder management, day export, shutdown

use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::clock::truncate_to_seconds;
use crate::core::{Clock, PlannerError, PlannerResult, SystemClock};
use crate::features::agenda::{self, ExportFormat};
use crate::features::appointments::{Appointment, AppointmentId, AppointmentStore};
use crate::features::conflict::OverlapValidator;
use crate::features::notifications::{Notification, NotificationChannel};
use crate::features::reminders::{ReminderScheduler, SharedStore};

#[derive(Clone)]
pub struct Planner {
    store: SharedStore,
    scheduler: ReminderScheduler,
    channel: NotificationChannel,
    clock: Arc<dyn Clock>,
}

impl Planner {
    pub fn new(channel: NotificationChannel, clock: Arc<dyn Clock>) -> Self {
        let store: SharedStore = Arc::new(Mutex::new(AppointmentStore::new()));
        let scheduler = ReminderScheduler::new(store.clone(), channel.clone(), clock.clone());
        Planner {
            store,
            scheduler,
            channel,
            clock,
        }
    }

    /// Planner driven by the local wall clock
    pub fn with_system_clock(channel: NotificationChannel) -> Self {
        Self::new(channel, Arc::new(SystemClock))
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    fn reject<T>(
        &self,
        id: Option<AppointmentId>,
        action: &str,
        err: PlannerError,
    ) -> PlannerResult<T> {
        info!("Rejected ({}): {action}: {err}", err.code());
        self.channel
            .publish(Notification::rejected(id, format!("{action}: {err}")));
        Err(err)
    }

    /// Validate and insert a new appointment
    pub async fn create_appointment(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: &str,
    ) -> PlannerResult<Appointment> {
        let (start, end) = (truncate_to_seconds(start), truncate_to_seconds(end));
        let mut store = self.store.lock().await;

        let verdict = OverlapValidator::new(&store).validate_new(start, end, self.clock.now());
        if let Err(e) = verdict {
            return self.reject(None, "Appointment cannot be created", e);
        }

        let appointment = store.create(start, end, title);
        store.insert(appointment.clone());
        info!("Created appointment {} ({appointment})", appointment.id());
        self.channel
            .publish(Notification::info(Some(appointment.id()), "Appointment added"));
        Ok(appointment)
    }

    /// Move the start; a pending reminder follows the new start
    pub async fn change_start(
        &self,
        id: AppointmentId,
        start: NaiveDateTime,
    ) -> PlannerResult<Appointment> {
        let start = truncate_to_seconds(start);
        let mut store = self.store.lock().await;

        if let Err(e) = OverlapValidator::new(&store).validate_edit_start(id, start) {
            return self.reject(Some(id), "Start time cannot be changed", e);
        }
        store.set_start(id, start)?;
        self.channel
            .publish(Notification::info(Some(id), "Meeting start time changed"));

        let lead = store.get(id).and_then(|a| a.reminder().lead());
        if let Some(lead) = lead {
            if let Err(PlannerError::ReminderPastDue { .. }) =
                self.scheduler.rearm(&mut store, id, lead)
            {
                warn!("Reminder for {id} is past due after the start change, disarming");
                self.scheduler.disarm(&mut store, id)?;
            }
        }

        store.get(id).cloned().ok_or(PlannerError::NotFound)
    }

    pub async fn change_end(
        &self,
        id: AppointmentId,
        end: NaiveDateTime,
    ) -> PlannerResult<Appointment> {
        let end = truncate_to_seconds(end);
        let mut store = self.store.lock().await;

        if let Err(e) = OverlapValidator::new(&store).validate_edit_end(id, end) {
            return self.reject(Some(id), "End time cannot be changed", e);
        }
        store.set_end(id, end)?;
        self.channel
            .publish(Notification::info(Some(id), "Meeting end time changed"));
        store.get(id).cloned().ok_or(PlannerError::NotFound)
    }

    pub async fn rename(&self, id: AppointmentId, title: &str) -> PlannerResult<Appointment> {
        let mut store = self.store.lock().await;
        if let Err(e) = store.set_title(id, title) {
            return self.reject(Some(id), "Title cannot be changed", e);
        }
        self.channel
            .publish(Notification::info(Some(id), "Meeting title changed"));
        store.get(id).cloned().ok_or(PlannerError::NotFound)
    }

    /// Delete the appointment and cancel its pending reminder
    pub async fn remove(&self, id: AppointmentId) -> PlannerResult<Appointment> {
        let mut store = self.store.lock().await;
        match store.remove(id) {
            Ok(removed) => {
                self.scheduler.cancel(id);
                info!("Removed appointment {id}");
                self.channel
                    .publish(Notification::info(Some(id), "Appointment removed"));
                Ok(removed)
            }
            Err(e) => self.reject(Some(id), "Appointment cannot be removed", e),
        }
    }

    /// Arm a reminder, or rearm when one is already pending
    pub async fn set_reminder(
        &self,
        id: AppointmentId,
        lead: Duration,
    ) -> PlannerResult<NaiveDateTime> {
        let mut store = self.store.lock().await;
        if self.scheduler.is_pending(id) {
            self.scheduler.rearm(&mut store, id, lead)
        } else {
            self.scheduler.arm(&mut store, id, lead)
        }
    }

    pub async fn clear_reminder(&self, id: AppointmentId) -> PlannerResult<bool> {
        let mut store = self.store.lock().await;
        self.scheduler.disarm(&mut store, id)
    }

    pub async fn get(&self, id: AppointmentId) -> Option<Appointment> {
        self.store.lock().await.get(id).cloned()
    }

    pub async fn find_by_start(&self, start: NaiveDateTime) -> Option<Appointment> {
        self.store.lock().await.find_by_start(start).cloned()
    }

    /// Appointments starting on `date`, ascending by start
    pub async fn appointments_on(&self, date: NaiveDate) -> Vec<Appointment> {
        let store = self.store.lock().await;
        let mut day: Vec<Appointment> = store
            .find_all_on_date(date)
            .into_iter()
            .cloned()
            .collect();
        day.sort_by_key(|a| a.start());
        day
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Save the day's agenda under `dir`
    pub async fn export_day(
        &self,
        date: NaiveDate,
        dir: &Path,
        format: ExportFormat,
    ) -> anyhow::Result<PathBuf> {
        let day = self.appointments_on(date).await;
        match agenda::save_day(dir, date, &day, format) {
            Ok(path) => {
                self.channel.publish(Notification::info(
                    None,
                    format!("Agenda for {date} saved to {}", path.display()),
                ));
                Ok(path)
            }
            Err(e) => {
                self.channel.publish(Notification::rejected(
                    None,
                    format!("Agenda for {date} could not be saved: {e:#}"),
                ));
                Err(e)
            }
        }
    }

    /// Cancel every pending reminder before the planner goes away
    pub async fn shutdown(&self) -> usize {
        let mut store = self.store.lock().await;
        let cancelled = self.scheduler.disarm_all(&mut store);
        info!("Planner shut down, {cancelled} reminder(s) cancelled");
        cancelled
    }
}
