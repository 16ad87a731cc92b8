//! # Notifications Feature
//!
//! Publish/subscribe channel for planner status messages.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod channel;

pub use channel::{Notification, NotificationChannel, NotificationKind, SubscriptionId};
