//! Environment-driven configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Log level, export directory/format, default title, reminder presets

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use std::path::PathBuf;

use crate::core::duration::parse_lead_time;
use crate::features::agenda::ExportFormat;

/// Title used when the user leaves the title prompt empty
pub const DEFAULT_TITLE: &str = "Secret meeting";

/// Reminder presets offered by the console menu
pub const DEFAULT_REMINDER_PRESETS: &str = "15m,1h,1d";

/// Default broadcast buffer for async notification receivers
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub export_dir: PathBuf,
    pub export_format: ExportFormat,
    pub default_title: String,
    pub reminder_presets: Vec<Duration>,
    pub notification_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            export_dir: PathBuf::from("."),
            export_format: ExportFormat::Text,
            default_title: DEFAULT_TITLE.to_string(),
            reminder_presets: vec![Duration::minutes(15), Duration::hours(1), Duration::days(1)],
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let export_dir = lookup("PLANNER_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        let export_format = match lookup("PLANNER_EXPORT_FORMAT") {
            Some(raw) => raw
                .parse::<ExportFormat>()
                .context("PLANNER_EXPORT_FORMAT")?,
            None => defaults.export_format,
        };

        let default_title = lookup("PLANNER_DEFAULT_TITLE")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(defaults.default_title);

        let presets_raw =
            lookup("PLANNER_REMINDER_PRESETS").unwrap_or_else(|| DEFAULT_REMINDER_PRESETS.to_string());
        let reminder_presets = parse_presets(&presets_raw)?;

        let notification_capacity = match lookup("PLANNER_NOTIFICATION_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid PLANNER_NOTIFICATION_CAPACITY: {raw}"))?
                .max(1),
            None => defaults.notification_capacity,
        };

        Ok(Config {
            log_level,
            export_dir,
            export_format,
            default_title,
            reminder_presets,
            notification_capacity,
        })
    }
}

fn parse_presets(raw: &str) -> Result<Vec<Duration>> {
    let presets = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_lead_time(s).ok_or_else(|| anyhow!("Invalid reminder preset: {s}")))
        .collect::<Result<Vec<_>>>()?;

    if presets.is_empty() {
        return Err(anyhow!("PLANNER_REMINDER_PRESETS must name at least one lead time"));
    }
    Ok(presets)
}
