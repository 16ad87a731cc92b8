//! # Feature: Overlap Validation
//!
//! Decides whether a prospective interval may be committed to the store.
//! Intervals are half-open: `[s1, e1)` and `[s2, e2)` conflict iff
//! `s1 < e2 && s2 < e1`, so back-to-back appointments are allowed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Creation, start-edit and end-edit checks over the whole store

use chrono::NaiveDateTime;
use log::debug;

use crate::core::{PlannerError, PlannerResult};
use crate::features::appointments::{Appointment, AppointmentId, AppointmentStore};

/// Read-only view over a store that answers "may this interval be committed?"
///
/// Every check is pure; a rejection carries the reason and nothing is changed.
pub struct OverlapValidator<'a> {
    store: &'a AppointmentStore,
}

impl<'a> OverlapValidator<'a> {
    pub fn new(store: &'a AppointmentStore) -> Self {
        OverlapValidator { store }
    }

    /// First appointment (other than `exclude`) intersecting `[start, end)`
    pub fn find_conflict(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<AppointmentId>,
    ) -> Option<&'a Appointment> {
        self.store
            .iter()
            .filter(|a| Some(a.id()) != exclude)
            .filter(|a| a.overlaps(start, end))
            .min_by_key(|a| a.start())
    }

    /// Checks for a brand-new appointment
    pub fn validate_new(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        now: NaiveDateTime,
    ) -> PlannerResult<()> {
        if start < now {
            return Err(PlannerError::PastStart { start, now });
        }
        if end <= start {
            return Err(PlannerError::InvalidRange { start, end });
        }
        self.check_overlap(start, end, None)
    }

    /// Checks for moving an existing appointment's start
    pub fn validate_edit_start(
        &self,
        id: AppointmentId,
        new_start: NaiveDateTime,
    ) -> PlannerResult<()> {
        let current = self.store.get(id).ok_or(PlannerError::NotFound)?;
        if new_start >= current.end() {
            return Err(PlannerError::InvalidRange {
                start: new_start,
                end: current.end(),
            });
        }
        if new_start == current.start() {
            return Err(PlannerError::Unchanged { value: new_start });
        }
        self.check_overlap(new_start, current.end(), Some(id))
    }

    /// Checks for moving an existing appointment's end
    pub fn validate_edit_end(&self, id: AppointmentId, new_end: NaiveDateTime) -> PlannerResult<()> {
        let current = self.store.get(id).ok_or(PlannerError::NotFound)?;
        if new_end <= current.start() {
            return Err(PlannerError::InvalidRange {
                start: current.start(),
                end: new_end,
            });
        }
        if new_end == current.end() {
            return Err(PlannerError::Unchanged { value: new_end });
        }
        self.check_overlap(current.start(), new_end, Some(id))
    }

    fn check_overlap(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<AppointmentId>,
    ) -> PlannerResult<()> {
        match self.find_conflict(start, end, exclude) {
            Some(other) => {
                debug!(
                    "Interval {start} - {end} conflicts with {} ({} - {})",
                    other.id(),
                    other.start(),
                    other.end()
                );
                Err(PlannerError::Overlap {
                    conflicting: other.id(),
                    start: other.start(),
                    end: other.end(),
                })
            }
            None => Ok(()),
        }
    }
}
