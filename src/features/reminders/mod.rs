//! # Reminders Feature
//!
//! One-shot reminders fired a lead time before an appointment starts.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod scheduler;

pub use scheduler::{fire_time, PendingReminder, ReminderScheduler, SharedStore};
