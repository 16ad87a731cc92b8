//! # Agenda Feature
//!
//! Day listings and day-file export.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod export;

pub use export::{day_file_path, render_day, render_day_json, save_day, ExportFormat};
