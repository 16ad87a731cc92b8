//! In-memory appointment collection
//!
//! The store trusts its caller: `insert` and the `set_*` mutators do not
//! validate. Interval checks belong to [`crate::features::conflict`] and run
//! before any of these are called.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use super::appointment::{Appointment, AppointmentId, ReminderState};
use crate::core::clock::truncate_to_seconds;
use crate::core::{PlannerError, PlannerResult};

#[derive(Debug, Default)]
pub struct AppointmentStore {
    appointments: HashMap<AppointmentId, Appointment>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        AppointmentStore {
            appointments: HashMap::new(),
        }
    }

    /// Build a new appointment without inserting it
    pub fn create(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: impl Into<String>,
    ) -> Appointment {
        Appointment::new(start, end, title)
    }

    pub fn insert(&mut self, appointment: Appointment) {
        self.appointments.insert(appointment.id, appointment);
    }

    pub fn remove(&mut self, id: AppointmentId) -> PlannerResult<Appointment> {
        self.appointments.remove(&id).ok_or(PlannerError::NotFound)
    }

    pub fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.get(&id)
    }

    /// Exact-match lookup by start instant
    pub fn find_by_start(&self, start: NaiveDateTime) -> Option<&Appointment> {
        let start = truncate_to_seconds(start);
        self.appointments.values().find(|a| a.start == start)
    }

    /// Every appointment starting on `date`, unordered
    pub fn find_all_on_date(&self, date: NaiveDate) -> Vec<&Appointment> {
        self.appointments
            .values()
            .filter(|a| a.start.date() == date)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Appointment> {
        self.appointments.values()
    }

    pub fn set_start(&mut self, id: AppointmentId, start: NaiveDateTime) -> PlannerResult<()> {
        self.entry_mut(id)?.start = truncate_to_seconds(start);
        Ok(())
    }

    pub fn set_end(&mut self, id: AppointmentId, end: NaiveDateTime) -> PlannerResult<()> {
        self.entry_mut(id)?.end = truncate_to_seconds(end);
        Ok(())
    }

    pub fn set_title(&mut self, id: AppointmentId, title: impl Into<String>) -> PlannerResult<()> {
        self.entry_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_reminder_state(
        &mut self,
        id: AppointmentId,
        state: ReminderState,
    ) -> PlannerResult<()> {
        self.entry_mut(id)?.reminder = state;
        Ok(())
    }

    fn entry_mut(&mut self, id: AppointmentId) -> PlannerResult<&mut Appointment> {
        self.appointments.get_mut(&id).ok_or(PlannerError::NotFound)
    }
}
