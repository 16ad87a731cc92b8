//! Parsing of user-entered dates and instants for the console
//!
//! Accepts the day-first dotted layout (`01.01.2001 01:00:00`) as well as
//! ISO-style input (`2001-01-01 01:00`).

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};

const INSTANT_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d"];

pub fn parse_instant(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    INSTANT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| anyhow!("Unrecognised date and time: {input:?} (e.g. 01.01.2001 01:00:00)"))
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .ok_or_else(|| anyhow!("Unrecognised date: {input:?} (e.g. 01.01.2001)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_layouts() {
        let expected = NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        assert_eq!(parse_instant("01.01.2001 01:00:00").unwrap(), expected);
        assert_eq!(parse_instant("01.01.2001 01:00").unwrap(), expected);
        assert_eq!(parse_instant(" 2001-01-01 01:00 ").unwrap(), expected);
        assert_eq!(parse_instant("2001-01-01T01:00:00").unwrap(), expected);
        assert!(parse_instant("tomorrow").is_err());
        assert!(parse_instant("32.01.2001 01:00").is_err());
    }

    #[test]
    fn test_parse_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert_eq!(parse_date("01.01.2001").unwrap(), expected);
        assert_eq!(parse_date("2001-01-01").unwrap(), expected);
        assert!(parse_date("01/01/2001").is_err());
    }
}
