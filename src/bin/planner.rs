//! Interactive console for the meeting planner
//!
//! Add, edit and remove meetings, set reminders, list a day and save it to a
//! file. Status messages arrive through the planner's notification channel.
//!
//! Usage: cargo run --bin planner

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use dialoguer::{Confirm, Input, Select};
use dotenvy::dotenv;
use log::{error, info};

use meeting_planner::core::input::{parse_date, parse_instant};
use meeting_planner::core::format_lead_time;
use meeting_planner::{Appointment, Config, NotificationChannel, NotificationKind, Planner};

const MAIN_MENU: &[&str] = &[
    "Add a meeting",
    "Change or remove a meeting",
    "Show meetings for a day",
    "Quit",
];

const EDIT_MENU: &[&str] = &[
    "Start time",
    "End time",
    "Title",
    "Reminder",
    "Remove the meeting",
    "Never mind",
];

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting meeting planner...");

    let channel = NotificationChannel::new(config.notification_capacity);
    channel.subscribe(|n| match n.kind {
        NotificationKind::Reminder => println!("\n🔔 {n}"),
        NotificationKind::Rejected => println!("❌ {n}"),
        NotificationKind::Info => println!("✅ {n}"),
    });
    let planner = Planner::with_system_clock(channel);

    println!("Hi! This planner helps you organise your time.");
    println!("Create meetings, change or remove them, and get reminded before they start.\n");

    loop {
        let choice = Select::new()
            .with_prompt("Menu")
            .items(MAIN_MENU)
            .default(0)
            .interact()?;

        match choice {
            0 => add_meeting(&planner, &config).await?,
            1 => edit_meeting(&planner, &config).await?,
            2 => show_day(&planner, &config).await?,
            _ => break,
        }
    }

    let cancelled = planner.shutdown().await;
    info!("Exiting with {cancelled} reminder(s) cancelled");
    println!("Bye!");
    Ok(())
}

fn prompt_instant(prompt: &str) -> Result<NaiveDateTime> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| -> Result<(), String> {
            parse_instant(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    parse_instant(&raw)
}

fn prompt_date(prompt: &str) -> Result<NaiveDate> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| -> Result<(), String> {
            parse_date(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    parse_date(&raw)
}

fn prompt_title(prompt: &str, config: &Config) -> Result<String> {
    let title: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    if title.trim().is_empty() {
        Ok(config.default_title.clone())
    } else {
        Ok(title.trim().to_string())
    }
}

/// Pick a reminder preset; `None` means no reminder
fn prompt_reminder(prompt: &str, config: &Config) -> Result<Option<Duration>> {
    let mut items: Vec<String> = config
        .reminder_presets
        .iter()
        .map(|lead| format!("{} before", format_lead_time(*lead)))
        .collect();
    items.push("No reminder".to_string());

    let choice = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(items.len() - 1)
        .interact()?;
    Ok(config.reminder_presets.get(choice).copied())
}

async fn add_meeting(planner: &Planner, config: &Config) -> Result<()> {
    println!("Ok, let's create a meeting!");
    let start = prompt_instant("Start date and time (e.g. 01.01.2001 01:00:00)")?;
    let title = prompt_title("Title (e.g. Lunch with Maria)", config)?;
    let end = prompt_instant("End date and time (e.g. 01.01.2001 02:00:00)")?;

    // Rejections are reported on the notification channel
    let Ok(meeting) = planner.create_appointment(start, end, &title).await else {
        return Ok(());
    };

    match prompt_reminder("Add a reminder?", config)? {
        Some(lead) => {
            let _ = planner.set_reminder(meeting.id(), lead).await;
        }
        None => println!("Ok, no reminder."),
    }
    Ok(())
}

async fn edit_meeting(planner: &Planner, config: &Config) -> Result<()> {
    if planner.is_empty().await {
        println!("There are no meetings yet, pick \"Add a meeting\" to create one.");
        return Ok(());
    }

    let start = prompt_instant("Start of the meeting to change (e.g. 01.01.2001 01:00:00)")?;
    let Some(meeting) = planner.find_by_start(start).await else {
        println!("No meeting starts at {start}.");
        return Ok(());
    };
    println!("Selected: {meeting}");

    let choice = Select::new()
        .with_prompt("What would you like to change?")
        .items(EDIT_MENU)
        .default(EDIT_MENU.len() - 1)
        .interact()?;

    let id = meeting.id();
    match choice {
        0 => {
            let new_start = prompt_instant("New start (e.g. 01.01.2001 01:00:00)")?;
            let _ = planner.change_start(id, new_start).await;
        }
        1 => {
            let new_end = prompt_instant("New end (e.g. 01.01.2001 02:00:00)")?;
            let _ = planner.change_end(id, new_end).await;
        }
        2 => {
            let title = prompt_title("New title (e.g. Call with Pavel)", config)?;
            let _ = planner.rename(id, &title).await;
        }
        3 => match prompt_reminder("When should I remind you?", config)? {
            Some(lead) => {
                let _ = planner.set_reminder(id, lead).await;
            }
            None => {
                if !matches!(planner.clear_reminder(id).await, Ok(true)) {
                    println!("Ok, no reminder.");
                }
            }
        },
        4 => {
            let _ = planner.remove(id).await;
        }
        _ => println!("Ok, nothing changed."),
    }
    Ok(())
}

fn print_day(date: NaiveDate, meetings: &[Appointment]) {
    if meetings.is_empty() {
        println!("No meetings on {date}.");
        return;
    }
    println!("Meetings on {date}:");
    for meeting in meetings {
        println!("  {meeting} [reminder: {}]", meeting.reminder());
    }
}

async fn show_day(planner: &Planner, config: &Config) -> Result<()> {
    if planner.is_empty().await {
        println!("There are no meetings yet, pick \"Add a meeting\" to create one.");
        return Ok(());
    }

    let date = prompt_date("Date (e.g. 01.01.2001)")?;
    let meetings = planner.appointments_on(date).await;
    print_day(date, &meetings);

    let save = Confirm::new()
        .with_prompt("Save this day to a file?")
        .default(false)
        .interact()?;
    if save {
        if let Err(e) = planner
            .export_day(date, &config.export_dir, config.export_format)
            .await
        {
            error!("Export failed: {e:#}");
        }
    }
    Ok(())
}
