//! Derived view state computed from raw log dates.
//!
//! Everything here is a pure function of the logs and "today"; callers
//! recompute on every load instead of storing counters.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::dates::{is_week_end, is_week_start, week_bounds, yesterday};

/// Consecutive days with a log, counted backward from `today`. A day
/// without a log ends the walk, so the result is 0 when today is missing.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while dates.contains(&day) {
        streak += 1;
        match yesterday(day) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive dates anywhere in the set.
pub fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates {
        current = match previous {
            Some(prev) if date.signed_duration_since(prev).num_days() == 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(date);
    }

    longest
}

/// Logs dated inside the Monday–Sunday week that contains `today`.
pub fn weekly_count<'a>(
    log_dates: impl IntoIterator<Item = &'a NaiveDate>,
    today: NaiveDate,
) -> u32 {
    let (start, end) = week_bounds(today);
    log_dates
        .into_iter()
        .filter(|&&date| date >= start && date <= end)
        .count() as u32
}

/// How one calendar cell is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayMark {
    pub date: NaiveDate,
    pub sticker_count: u32,
    pub is_today: bool,
    /// Left cap of a joined pill. Set when the previous day is empty or the
    /// day opens a week row (Sunday).
    pub span_start: bool,
    /// Right cap. Set when the next day is empty or the day closes a week
    /// row (Saturday).
    pub span_end: bool,
}

impl DayMark {
    pub fn has_stickers(&self) -> bool {
        self.sticker_count > 0
    }

    /// A marked day with no neighbours draws as a dot rather than a pill.
    pub fn is_single(&self) -> bool {
        self.has_stickers() && self.span_start && self.span_end
    }
}

/// Marks for every day that has stickers, plus today.
pub fn calendar_marks(
    counts: &BTreeMap<NaiveDate, u32>,
    today: NaiveDate,
) -> BTreeMap<NaiveDate, DayMark> {
    let has = |date: Option<NaiveDate>| {
        date.and_then(|d| counts.get(&d))
            .is_some_and(|&count| count > 0)
    };

    let mut marks: BTreeMap<NaiveDate, DayMark> = counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(&date, &count)| {
            let mark = DayMark {
                date,
                sticker_count: count,
                is_today: date == today,
                span_start: is_week_start(date) || !has(date.pred_opt()),
                span_end: is_week_end(date) || !has(date.succ_opt()),
            };
            (date, mark)
        })
        .collect();

    marks.entry(today).or_insert(DayMark {
        date: today,
        sticker_count: 0,
        is_today: true,
        span_start: false,
        span_end: false,
    });

    marks
}
