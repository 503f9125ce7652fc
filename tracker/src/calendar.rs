use chrono::NaiveDate;
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::{BTreeMap, BTreeSet};

use crate::aggregation::{calendar_marks, current_streak, weekly_count, DayMark};
use crate::dates::{month_bounds, week_bounds, Clock};
use crate::error::Result;
use crate::models::DayDetail;
use crate::sticker_logs;

/// Number of logs with `start <= date <= end`, across all challenges.
pub async fn get_weekly_sticker_count(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u32> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM daily_sticker_logs WHERE date >= ?1 AND date <= ?2",
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;
    Ok(count as u32)
}

/// Log count per day of the month. Days without logs are absent.
pub async fn get_calendar_month(
    pool: &SqlitePool,
    year: i32,
    month: u32,
) -> Result<BTreeMap<NaiveDate, u32>> {
    let (first, last) = month_bounds(year, month)?;

    let rows = sqlx::query(
        r#"
        SELECT date, COUNT(*) AS sticker_count
        FROM daily_sticker_logs
        WHERE date >= ?1 AND date <= ?2
        GROUP BY date
        ORDER BY date
        "#,
    )
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let date: NaiveDate = row.try_get("date")?;
        let count: i64 = row.try_get("sticker_count")?;
        counts.insert(date, count as u32);
    }

    tracing::debug!("{:04}-{:02}: {} active days", year, month, counts.len());
    Ok(counts)
}

pub async fn get_day_detail(pool: &SqlitePool, date: NaiveDate) -> Result<DayDetail> {
    let logs = sticker_logs::get_logs_by_date(pool, date).await?;
    Ok(DayDetail {
        date,
        total_stickers: logs.len() as u32,
        logs,
    })
}

/// Every distinct day that has at least one log, up to and including `until`.
pub async fn get_active_dates(pool: &SqlitePool, until: NaiveDate) -> Result<BTreeSet<NaiveDate>> {
    let dates: Vec<NaiveDate> =
        sqlx::query_scalar("SELECT DISTINCT date FROM daily_sticker_logs WHERE date <= ?1")
            .bind(until)
            .fetch_all(pool)
            .await?;
    Ok(dates.into_iter().collect())
}

/// Everything the calendar screen draws for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    pub today: NaiveDate,
    /// Marked days of this month in date order.
    pub marks: Vec<DayMark>,
    pub total_stickers: u32,
    pub active_days: u32,
    /// Stickers placed in the Monday–Sunday week containing today.
    pub weekly_count: u32,
    pub streak: u32,
}

pub async fn load_calendar_view(
    pool: &SqlitePool,
    clock: &dyn Clock,
    year: i32,
    month: u32,
) -> Result<CalendarView> {
    let today = clock.today();
    let (first, last) = month_bounds(year, month)?;
    let counts = get_calendar_month(pool, year, month).await?;

    let (week_start, week_end) = week_bounds(today);
    let week_logs = sticker_logs::get_logs_by_range(pool, week_start, week_end).await?;
    let weekly_count = weekly_count(week_logs.iter().map(|log| &log.date), today);
    let streak = current_streak(&get_active_dates(pool, today).await?, today);

    let marks: Vec<DayMark> = calendar_marks(&counts, today)
        .into_values()
        .filter(|mark| mark.date >= first && mark.date <= last)
        .collect();

    Ok(CalendarView {
        year,
        month,
        today,
        marks,
        total_stickers: counts.values().sum(),
        active_days: counts.len() as u32,
        weekly_count,
        streak,
    })
}
