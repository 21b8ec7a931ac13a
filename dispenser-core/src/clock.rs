//! Wall-clock seam.
//!
//! The ledger never reads the system time directly. Production code uses
//! [`SystemClock`]; tests drive a [`FixedClock`].

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::sync::Mutex;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Today's calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current time of day truncated to whole seconds.
    fn time_of_day(&self) -> NaiveTime {
        whole_seconds(self.now())
    }
}

/// Time of day of `at`, truncated to whole seconds.
pub fn whole_seconds(at: NaiveDateTime) -> NaiveTime {
    let time = at.time();
    time.with_nanosecond(0).unwrap_or(time)
}

/// Clock backed by the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock set to midnight of `date`.
    pub fn at_midnight(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::MIN))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_fixed_clock_reports_date_and_time() {
        let clock = FixedClock::new(ts(2025, 11, 13, 9, 0, 0));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 11, 13).unwrap());
        assert_eq!(clock.time_of_day(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn test_time_of_day_drops_subseconds() {
        let at = NaiveDate::from_ymd_opt(2025, 11, 13)
            .unwrap()
            .and_hms_milli_opt(9, 0, 1, 750)
            .unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.time_of_day().to_string(), "09:00:01");
    }

    #[test]
    fn test_whole_seconds_never_rolls_over() {
        let at = NaiveDate::from_ymd_opt(2025, 11, 13)
            .unwrap()
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap();
        assert_eq!(whole_seconds(at), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        assert_eq!(at.date(), NaiveDate::from_ymd_opt(2025, 11, 13).unwrap());
    }

    #[test]
    fn test_advance_crosses_midnight() {
        let clock = FixedClock::new(ts(2025, 11, 13, 23, 59, 30));
        clock.advance(TimeDelta::seconds(45));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 11, 14).unwrap());
        assert_eq!(clock.time_of_day(), NaiveTime::from_hms_opt(0, 0, 15).unwrap());
    }

    #[test]
    fn test_at_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 13).unwrap();
        let clock = FixedClock::at_midnight(date);
        assert_eq!(clock.now(), date.and_hms_opt(0, 0, 0).unwrap());
    }
}
