//! # Conflict Feature
//!
//! Rejects appointments whose time range intersects another appointment.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod validator;

pub use validator::OverlapValidator;
