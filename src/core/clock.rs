//! Wall-clock source used for past-start and reminder checks
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use std::sync::{Arc, RwLock};

/// Provides "now" as a naive local instant with second precision
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Drop sub-second precision
pub fn truncate_to_seconds(instant: NaiveDateTime) -> NaiveDateTime {
    instant.with_nanosecond(0).unwrap_or(instant)
}

/// Local system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        truncate_to_seconds(Local::now().naive_local())
    }
}

/// Settable clock for tests and simulations
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        ManualClock {
            now: Arc::new(RwLock::new(truncate_to_seconds(now))),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.write() {
            *guard = truncate_to_seconds(now);
        }
    }

    /// Move forward by `by`; a step past chrono's range is ignored
    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            if let Some(next) = guard.checked_add_signed(by) {
                *guard = next;
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_manual_clock_advances() {
        let start = NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), start + Duration::minutes(90));
    }

    #[test]
    fn test_manual_clock_set_drops_subseconds() {
        let day = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let clock = ManualClock::new(day.and_hms_opt(9, 0, 0).unwrap());
        clock.set(day.and_hms_milli_opt(14, 30, 5, 750).unwrap());
        assert_eq!(clock.now(), day.and_hms_opt(14, 30, 5).unwrap());

        clock.advance(Duration::days(100_000_000));
        assert_eq!(clock.now(), day.and_hms_opt(14, 30, 5).unwrap());
    }

    #[test]
    fn test_system_clock_has_no_subseconds() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }
}
