//! # Feature: Agenda Export
//!
//! Writes one day's appointments to `<YYYY-MM-DD>.txt` (one line per
//! appointment) or `<YYYY-MM-DD>.json`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.0.0: Text and JSON day files

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::features::appointments::Appointment;

const INSTANT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            _ => Err(anyhow!("Invalid export format: {}", s)),
        }
    }
}

/// Exported shape of a single appointment
#[derive(Debug, Serialize)]
struct AgendaEntry<'a> {
    start: NaiveDateTime,
    end: NaiveDateTime,
    title: &'a str,
}

fn sorted(appointments: &[Appointment]) -> Vec<&Appointment> {
    let mut sorted: Vec<&Appointment> = appointments.iter().collect();
    sorted.sort_by_key(|a| a.start());
    sorted
}

/// One line per appointment, ascending by start
pub fn render_day(appointments: &[Appointment]) -> String {
    let mut out = String::new();
    for a in sorted(appointments) {
        out.push_str(&format!(
            "{} - {}: {}\n",
            a.start().format(INSTANT_FORMAT),
            a.end().format(INSTANT_FORMAT),
            a.title()
        ));
    }
    out
}

pub fn render_day_json(appointments: &[Appointment]) -> Result<String> {
    let entries: Vec<AgendaEntry> = sorted(appointments)
        .into_iter()
        .map(|a| AgendaEntry {
            start: a.start(),
            end: a.end(),
            title: a.title(),
        })
        .collect();
    serde_json::to_string_pretty(&entries).context("Failed to serialize agenda")
}

pub fn day_file_path(dir: &Path, date: NaiveDate, format: ExportFormat) -> PathBuf {
    dir.join(format!("{}.{}", date.format("%Y-%m-%d"), format.extension()))
}

/// Write the day file, replacing any previous export for the same date
pub fn save_day(
    dir: &Path,
    date: NaiveDate,
    appointments: &[Appointment],
    format: ExportFormat,
) -> Result<PathBuf> {
    let contents = match format {
        ExportFormat::Text => render_day(appointments),
        ExportFormat::Json => render_day_json(appointments)?,
    };

    if !dir.is_dir() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    }

    let path = day_file_path(dir, date, format);
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        "Exported {} appointment(s) for {date} to {}",
        appointments.len(),
        path.display()
    );
    Ok(path)
}
