//! Lead-time parsing and human-readable formatting
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Shorthand parser (`15m`, `1h30m`, `1d`) and formatter for reminder lead times

use chrono::Duration;

/// Parse a time duration string like "30m", "2h", "1d", "1h30m"
pub fn parse_lead_time(time_str: &str) -> Option<Duration> {
    let time_str = time_str.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();

    for c in time_str.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
        } else if !current_number.is_empty() {
            let value: i64 = current_number.parse().ok()?;
            current_number.clear();

            let unit: i64 = match c {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 60 * 60 * 24,
                'w' => 60 * 60 * 24 * 7,
                _ => return None,
            };
            total_seconds = total_seconds.checked_add(value.checked_mul(unit)?)?;
        } else if !c.is_whitespace() {
            return None;
        }
    }

    // A trailing bare number has no unit
    if !current_number.is_empty() {
        return None;
    }

    if total_seconds > 0 {
        Duration::try_seconds(total_seconds)
    } else {
        None
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Format a duration into a human-readable string
pub fn format_lead_time(duration: Duration) -> String {
    let seconds = duration.num_seconds();
    if seconds < 60 {
        format!("{} second{}", seconds, plural(seconds))
    } else if seconds < 3600 {
        let mins = seconds / 60;
        format!("{} minute{}", mins, plural(mins))
    } else if seconds < 86400 {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{} hour{} {} minute{}", hours, plural(hours), mins, plural(mins))
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    } else {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        if hours > 0 {
            format!("{} day{} {} hour{}", days, plural(days), hours, plural(hours))
        } else {
            format!("{} day{}", days, plural(days))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lead_time() {
        assert_eq!(parse_lead_time("30s"), Some(Duration::seconds(30)));
        assert_eq!(parse_lead_time("15m"), Some(Duration::minutes(15)));
        assert_eq!(parse_lead_time("1h"), Some(Duration::hours(1)));
        assert_eq!(parse_lead_time("1d"), Some(Duration::days(1)));
        assert_eq!(parse_lead_time("1w"), Some(Duration::weeks(1)));
        assert_eq!(parse_lead_time("1h30m"), Some(Duration::minutes(90)));
        assert_eq!(parse_lead_time(" 2H "), Some(Duration::hours(2)));
        assert_eq!(parse_lead_time("invalid"), None);
        assert_eq!(parse_lead_time("15"), None);
        assert_eq!(parse_lead_time(""), None);
        assert_eq!(parse_lead_time("0m"), None);
    }

    #[test]
    fn test_parse_lead_time_out_of_range() {
        assert_eq!(parse_lead_time("999999999999999999m"), None);
        assert_eq!(parse_lead_time("9999999999999999s"), None);
        assert_eq!(parse_lead_time("99999999999999999999s"), None);
        assert_eq!(parse_lead_time("9000000000000000000s1s"), None);
        // Large but representable
        assert_eq!(
            parse_lead_time("100000000d"),
            Some(Duration::days(100_000_000))
        );
    }

    #[test]
    fn test_format_lead_time() {
        assert_eq!(format_lead_time(Duration::seconds(1)), "1 second");
        assert_eq!(format_lead_time(Duration::minutes(15)), "15 minutes");
        assert_eq!(format_lead_time(Duration::hours(1)), "1 hour");
        assert_eq!(format_lead_time(Duration::minutes(61)), "1 hour 1 minute");
        assert_eq!(format_lead_time(Duration::days(1)), "1 day");
        assert_eq!(format_lead_time(Duration::hours(25)), "1 day 1 hour");
    }
}
