//! # Core Module
//!
//! Configuration, clock, error taxonomy and input helpers for the planner.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod input;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use duration::{format_lead_time, parse_lead_time};
pub use error::{PlannerError, PlannerResult};
