// Core layer - configuration, clock, errors, input helpers
pub mod core;

// Features layer - appointments, conflict checks, reminders, notifications, agenda
pub mod features;

// Application layer
pub mod planner;

// Re-export core items
pub use crate::core::{Clock, Config, ManualClock, PlannerError, PlannerResult, SystemClock};

// Re-export feature items
pub use features::{
    // Agenda
    ExportFormat,
    // Appointments
    Appointment, AppointmentId, AppointmentStore, ReminderState,
    // Conflict
    OverlapValidator,
    // Notifications
    Notification, NotificationChannel, NotificationKind, SubscriptionId,
    // Reminders
    ReminderScheduler, SharedStore,
};

pub use planner::Planner;
