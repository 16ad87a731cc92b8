//! Appointment entity and its reminder state

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::clock::truncate_to_seconds;

/// Stable identifier assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(Uuid);

impl AppointmentId {
    pub fn new() -> Self {
        AppointmentId(Uuid::new_v4())
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an appointment's one-shot reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReminderState {
    /// Never armed
    #[default]
    None,
    /// Pending, fires at `fire_at` (= start - lead)
    Scheduled {
        fire_at: NaiveDateTime,
        #[serde(with = "lead_seconds")]
        lead: Duration,
    },
    /// Already delivered
    Fired,
    /// Disarmed before it fired
    Cancelled,
}

impl ReminderState {
    /// Lead time of a pending reminder
    pub fn lead(&self) -> Option<Duration> {
        match self {
            ReminderState::Scheduled { lead, .. } => Some(*lead),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReminderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderState::None => write!(f, "none"),
            ReminderState::Scheduled { fire_at, .. } => write!(f, "scheduled for {fire_at}"),
            ReminderState::Fired => write!(f, "fired"),
            ReminderState::Cancelled => write!(f, "cancelled"),
        }
    }
}

mod lead_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(lead: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(lead.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        i64::deserialize(d).map(Duration::seconds)
    }
}

/// A time-bounded meeting occupying `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub(crate) id: AppointmentId,
    pub(crate) start: NaiveDateTime,
    pub(crate) end: NaiveDateTime,
    pub(crate) title: String,
    pub(crate) reminder: ReminderState,
}

impl Appointment {
    pub(crate) fn new(start: NaiveDateTime, end: NaiveDateTime, title: impl Into<String>) -> Self {
        Appointment {
            id: AppointmentId::new(),
            start: truncate_to_seconds(start),
            end: truncate_to_seconds(end),
            title: title.into(),
            reminder: ReminderState::None,
        }
    }

    pub fn id(&self) -> AppointmentId {
        self.id
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn reminder(&self) -> ReminderState {
        self.reminder
    }

    /// Half-open intersection test against `[start, end)`
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

impl std::fmt::Display for Appointment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}: {}", self.start, self.end, self.title)
    }
}
