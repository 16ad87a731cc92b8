//! # Appointments Feature
//!
//! Appointment entity and the in-memory store that owns every appointment.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod appointment;
pub mod store;

pub use appointment::{Appointment, AppointmentId, ReminderState};
pub use store::AppointmentStore;
