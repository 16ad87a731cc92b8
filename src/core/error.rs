//! Rejection reasons shared by the store, validator and scheduler
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Initial taxonomy (range, past start, overlap, not found, past-due reminder)

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::features::appointments::AppointmentId;

/// Why an operation was refused.
///
/// Every variant is a local, recoverable rejection. A refused operation never
/// leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// End is not strictly after start
    #[error("end {end} is not after start {start}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Start has already elapsed
    #[error("start {start} is already in the past (now {now})")]
    PastStart {
        start: NaiveDateTime,
        now: NaiveDateTime,
    },

    /// Candidate interval intersects another appointment
    #[error("overlaps appointment {conflicting} ({start} - {end})")]
    Overlap {
        conflicting: AppointmentId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("appointment not found")]
    NotFound,

    /// Computed fire time is not in the future.
    ///
    /// `fire_at` is `None` when `start - lead` falls before the earliest
    /// representable instant.
    #[error("reminder time {} has already passed", describe_fire_at(.fire_at))]
    ReminderPastDue { fire_at: Option<NaiveDateTime> },

    /// Edit would leave the instant as it is
    #[error("new value {value} is the same as the current one")]
    Unchanged { value: NaiveDateTime },
}

fn describe_fire_at(fire_at: &Option<NaiveDateTime>) -> String {
    match fire_at {
        Some(at) => at.to_string(),
        None => "(before the earliest representable date)".to_string(),
    }
}

impl PlannerError {
    /// Short machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerError::InvalidRange { .. } => "invalid_range",
            PlannerError::PastStart { .. } => "past_start",
            PlannerError::Overlap { .. } => "overlap",
            PlannerError::NotFound => "not_found",
            PlannerError::ReminderPastDue { .. } => "reminder_past_due",
            PlannerError::Unchanged { .. } => "unchanged",
        }
    }
}

/// Outcome of a planner operation
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;
