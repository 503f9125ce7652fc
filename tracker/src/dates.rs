use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "now" for everything that stamps or compares days.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day in the store's timezone.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// A clock pinned to one day. Every `now()` call advances by one second so
/// rows created in sequence keep a stable order.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
    ticks: AtomicI64,
}

impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
            ticks: AtomicI64::new(0),
        }
    }

    pub fn set_today(&self, today: NaiveDate) {
        *self.today.lock().unwrap_or_else(|e| e.into_inner()) = today;
    }

    pub fn advance_days(&self, days: i64) {
        let mut today = self.today.lock().unwrap_or_else(|e| e.into_inner());
        *today += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        self.today().and_time(NaiveTime::MIN).and_utc() + Duration::seconds(tick)
    }

    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_string()))
}

pub fn yesterday(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Monday..=Sunday window containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = date.week(Weekday::Mon);
    (week.first_day(), week.last_day())
}

/// First and last day of a month, `month` being 1..=12.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::InvalidDate(format!("{year:04}-{month:02}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok((first, last))
}

pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

pub fn is_week_end(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_format_and_parse() {
        assert_eq!(format_date(d(2025, 1, 5)), "2025-01-05");
        assert_eq!(parse_date("2025-01-05").unwrap(), d(2025, 1, 5));
        assert!(matches!(parse_date("2025/01/05"), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_yesterday_crosses_year() {
        assert_eq!(yesterday(d(2025, 1, 1)), Some(d(2024, 12, 31)));
        assert_eq!(yesterday(NaiveDate::MIN), None);
    }

    #[test]
    fn test_week_bounds_are_monday_to_sunday() {
        // 2025-01-05 is a Sunday
        assert_eq!(week_bounds(d(2025, 1, 5)), (d(2024, 12, 30), d(2025, 1, 5)));
        assert_eq!(week_bounds(d(2025, 1, 6)), (d(2025, 1, 6), d(2025, 1, 12)));
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_bounds(2025, 12).unwrap(), (d(2025, 12, 1), d(2025, 12, 31)));
        assert!(month_bounds(2025, 13).is_err());
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::on(d(2025, 1, 1));
        let first = clock.now();
        let second = clock.now();
        assert!(second > first);

        clock.advance_days(4);
        assert_eq!(clock.today(), d(2025, 1, 5));
        clock.set_today(d(2025, 2, 1));
        assert_eq!(clock.today(), d(2025, 2, 1));
    }

    #[test]
    fn test_system_clock_today_follows_timezone() {
        let seoul = SystemClock::new(chrono_tz::Asia::Seoul).today();
        let expected = Utc::now().with_timezone(&chrono_tz::Asia::Seoul).date_naive();
        // tolerate a midnight rollover between the two reads
        assert!((seoul - expected).num_days().abs() <= 1);
    }
}
