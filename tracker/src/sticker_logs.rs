use chrono::NaiveDate;
use sqlx::sqlite::{Sqlite, SqlitePool};

use crate::dates::Clock;
use crate::error::{is_unique_violation, Error, Result};
use crate::models::DailyStickerLog;

const LOG_COLUMNS: &str = "id, challenge_id, sticker_id, date, created_at";

/// Records the sticker a challenge earned on `date`. One log per
/// challenge and day; a second attempt is reported as `AlreadyPlaced`.
///
/// The checks run before the write, and the insert itself re-checks the
/// slot count, so the only write is a single autocommit statement. A
/// placement that races another one for the same day waits for the write
/// lock and then fails on `UNIQUE(challenge_id, date)`.
pub async fn add_sticker_log(
    pool: &SqlitePool,
    clock: &dyn Clock,
    challenge_id: &str,
    sticker_id: &str,
    date: NaiveDate,
) -> Result<DailyStickerLog> {
    let days: Option<i64> = sqlx::query_scalar("SELECT days FROM challenges WHERE id = ?1")
        .bind(challenge_id)
        .fetch_optional(pool)
        .await?;
    let days = days.ok_or_else(|| Error::ChallengeNotFound(challenge_id.to_string()))?;

    let sticker_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stickers WHERE id = ?1")
        .bind(sticker_id)
        .fetch_optional(pool)
        .await?;
    if sticker_exists.is_none() {
        return Err(Error::StickerNotFound(sticker_id.to_string()));
    }

    if has_log_on(pool, challenge_id, date).await? {
        tracing::warn!("challenge {} already has a sticker on {}", challenge_id, date);
        return Err(Error::AlreadyPlaced {
            challenge_id: challenge_id.to_string(),
            date,
        });
    }

    let log = DailyStickerLog {
        id: uuid::Uuid::new_v4().to_string(),
        challenge_id: challenge_id.to_string(),
        sticker_id: sticker_id.to_string(),
        date,
        created_at: clock.now(),
    };

    let inserted = sqlx::query(
        r#"
        INSERT INTO daily_sticker_logs (id, challenge_id, sticker_id, date, created_at)
        SELECT ?1, ?2, ?3, ?4, ?5
        WHERE (SELECT COUNT(*) FROM daily_sticker_logs WHERE challenge_id = ?2)
            < (SELECT days FROM challenges WHERE id = ?2)
        "#,
    )
    .bind(&log.id)
    .bind(&log.challenge_id)
    .bind(&log.sticker_id)
    .bind(log.date)
    .bind(log.created_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            tracing::warn!(
                "concurrent placement for challenge {} on {} lost the race",
                challenge_id,
                date
            );
            Error::AlreadyPlaced {
                challenge_id: challenge_id.to_string(),
                date,
            }
        } else {
            Error::Database(e)
        }
    })?
    .rows_affected();

    if inserted == 0 {
        return Err(Error::ChallengeFull(challenge_id.to_string()));
    }

    tracing::info!(
        "placed sticker {} on challenge {} for {} ({} days)",
        sticker_id,
        challenge_id,
        date,
        days
    );
    Ok(log)
}

/// Deletes the log of `date` and returns its id.
pub async fn remove_sticker_log(
    pool: &SqlitePool,
    challenge_id: &str,
    date: NaiveDate,
) -> Result<String> {
    let removed: Option<String> = sqlx::query_scalar(
        "DELETE FROM daily_sticker_logs WHERE challenge_id = ?1 AND date = ?2 RETURNING id",
    )
    .bind(challenge_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    match removed {
        Some(id) => {
            tracing::info!("removed sticker log {} ({} on {})", id, challenge_id, date);
            Ok(id)
        }
        None => Err(Error::LogNotFound {
            challenge_id: challenge_id.to_string(),
            date,
        }),
    }
}

pub async fn has_log_on(pool: &SqlitePool, challenge_id: &str, date: NaiveDate) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM daily_sticker_logs WHERE challenge_id = ?1 AND date = ?2")
            .bind(challenge_id)
            .bind(date)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// All challenges' logs for one day, newest first.
pub async fn get_logs_by_date(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<DailyStickerLog>> {
    let logs = sqlx::query_as::<_, DailyStickerLog>(&format!(
        "SELECT {LOG_COLUMNS} FROM daily_sticker_logs WHERE date = ?1 ORDER BY created_at DESC"
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(logs)
}

/// One challenge's logs in slot order.
pub async fn get_logs_by_challenge(
    pool: &SqlitePool,
    challenge_id: &str,
) -> Result<Vec<DailyStickerLog>> {
    let logs = sqlx::query_as::<_, DailyStickerLog>(&format!(
        "SELECT {LOG_COLUMNS} FROM daily_sticker_logs WHERE challenge_id = ?1 ORDER BY date ASC"
    ))
    .bind(challenge_id)
    .fetch_all(pool)
    .await?;
    Ok(logs)
}

pub async fn get_all_logs(pool: &SqlitePool) -> Result<Vec<DailyStickerLog>> {
    let logs = sqlx::query_as::<_, DailyStickerLog>(&format!(
        "SELECT {LOG_COLUMNS} FROM daily_sticker_logs ORDER BY date ASC, created_at ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(logs)
}

/// Logs with `start <= date <= end`.
pub async fn get_logs_by_range(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyStickerLog>> {
    let logs = sqlx::query_as::<_, DailyStickerLog>(&format!(
        "SELECT {LOG_COLUMNS} FROM daily_sticker_logs WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(logs)
}

/// Keeps the first `max_days` logs of a challenge in date order and deletes
/// the rest. Runs inside the caller's transaction when given one.
pub async fn remove_excess_logs<'e, E>(
    executor: E,
    challenge_id: &str,
    max_days: u32,
) -> Result<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let removed = sqlx::query(
        r#"
        DELETE FROM daily_sticker_logs
        WHERE id IN (
            SELECT id FROM daily_sticker_logs
            WHERE challenge_id = ?1
            ORDER BY date ASC
            LIMIT -1 OFFSET ?2
        )
        "#,
    )
    .bind(challenge_id)
    .bind(max_days as i64)
    .execute(executor)
    .await?
    .rows_affected();

    if removed > 0 {
        tracing::debug!("removed {} excess logs from challenge {}", removed, challenge_id);
    }
    Ok(removed)
}
