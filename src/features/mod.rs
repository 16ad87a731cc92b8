//! # Features
//!
//! Each planner feature lives in its own module with a versioned header.

pub mod agenda;
pub mod appointments;
pub mod conflict;
pub mod notifications;
pub mod reminders;

pub use agenda::ExportFormat;
pub use appointments::{Appointment, AppointmentId, AppointmentStore, ReminderState};
pub use conflict::OverlapValidator;
pub use notifications::{Notification, NotificationChannel, NotificationKind, SubscriptionId};
pub use reminders::{ReminderScheduler, SharedStore};
