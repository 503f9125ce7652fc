use futures::future::try_join_all;
use sqlx::sqlite::SqlitePool;

use crate::dates::Clock;
use crate::error::{Error, Result};
use crate::models::{Challenge, ChallengeProgress, ChallengeRow, ChallengeSummary, NewChallenge};
use crate::sticker_logs;

const CHALLENGE_COLUMNS: &str = "id, title, icon, days, reward, created_at";

fn validate(input: NewChallenge) -> Result<NewChallenge> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::InvalidChallenge("title is empty".into()));
    }
    let len = catalog::grapheme_len(&title);
    if len > catalog::MAX_TITLE_GRAPHEMES {
        return Err(Error::InvalidChallenge(format!(
            "title is {len} characters, at most {} allowed",
            catalog::MAX_TITLE_GRAPHEMES
        )));
    }
    if input.days == 0 || input.days > catalog::MAX_CHALLENGE_DAYS {
        return Err(Error::InvalidChallenge(format!(
            "days must be between 1 and {}, got {}",
            catalog::MAX_CHALLENGE_DAYS,
            input.days
        )));
    }
    let icon = match input.icon.trim() {
        "" => catalog::DEFAULT_CHALLENGE_ICON.to_string(),
        icon => icon.to_string(),
    };
    let reward = input
        .reward
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(NewChallenge {
        title,
        icon,
        days: input.days,
        reward,
    })
}

pub async fn create_challenge(
    pool: &SqlitePool,
    clock: &dyn Clock,
    input: NewChallenge,
) -> Result<Challenge> {
    let input = validate(input)?;
    let challenge = Challenge {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title,
        icon: input.icon,
        days: input.days,
        reward: input.reward,
        created_at: clock.now(),
    };

    sqlx::query(
        r#"
        INSERT INTO challenges (id, title, icon, days, reward, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&challenge.id)
    .bind(&challenge.title)
    .bind(&challenge.icon)
    .bind(challenge.days as i64)
    .bind(&challenge.reward)
    .bind(challenge.created_at)
    .execute(pool)
    .await?;

    tracing::info!(
        "created challenge {} ({:?}, {} days)",
        challenge.id,
        challenge.title,
        challenge.days
    );
    Ok(challenge)
}

pub async fn get_challenge(pool: &SqlitePool, id: &str) -> Result<Option<Challenge>> {
    let row = sqlx::query_as::<_, ChallengeRow>(&format!(
        "SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Challenge::from))
}

pub async fn require_challenge(pool: &SqlitePool, id: &str) -> Result<Challenge> {
    get_challenge(pool, id)
        .await?
        .ok_or_else(|| Error::ChallengeNotFound(id.to_string()))
}

/// Newest first.
pub async fn get_challenges(pool: &SqlitePool) -> Result<Vec<Challenge>> {
    let rows = sqlx::query_as::<_, ChallengeRow>(&format!(
        "SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY created_at DESC, rowid DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Challenge::from).collect())
}

/// Applies an edit. Shrinking `days` drops the logs that no longer fit,
/// latest dates first; the number of dropped logs is returned.
///
/// The update is the first statement of the transaction so the write lock
/// is taken before anything is read.
pub async fn update_challenge(pool: &SqlitePool, id: &str, input: NewChallenge) -> Result<u64> {
    let input = validate(input)?;
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE challenges SET title = ?1, icon = ?2, days = ?3, reward = ?4 WHERE id = ?5",
    )
    .bind(&input.title)
    .bind(&input.icon)
    .bind(input.days as i64)
    .bind(&input.reward)
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if updated == 0 {
        return Err(Error::ChallengeNotFound(id.to_string()));
    }

    // no-op unless the challenge now holds more logs than days
    let removed = sticker_logs::remove_excess_logs(&mut *tx, id, input.days).await?;

    tx.commit().await?;

    if removed > 0 {
        tracing::info!(
            "updated challenge {}: now {} days, removed {} excess logs",
            id,
            input.days,
            removed
        );
    } else {
        tracing::info!("updated challenge {}", id);
    }
    Ok(removed)
}

pub async fn delete_challenge(pool: &SqlitePool, id: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    let logs = sqlx::query("DELETE FROM daily_sticker_logs WHERE challenge_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM challenges WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(Error::ChallengeNotFound(id.to_string()));
    }

    tx.commit().await?;
    tracing::info!("deleted challenge {} and {} logs", id, logs);
    Ok(())
}

pub async fn get_challenge_progress(pool: &SqlitePool, id: &str) -> Result<ChallengeProgress> {
    let total_days: Option<i64> = sqlx::query_scalar("SELECT days FROM challenges WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let total_days = total_days.ok_or_else(|| Error::ChallengeNotFound(id.to_string()))?;

    let completed_days: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT date) FROM daily_sticker_logs WHERE challenge_id = ?1",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(ChallengeProgress::new(
        u32::try_from(total_days).unwrap_or(0),
        u32::try_from(completed_days).unwrap_or(0),
    ))
}

/// Challenge list as the home screen shows it: unfinished challenges first,
/// newest first within each group.
pub async fn list_challenges_with_progress(pool: &SqlitePool) -> Result<Vec<ChallengeSummary>> {
    let challenges = get_challenges(pool).await?;

    let progress = try_join_all(
        challenges
            .iter()
            .map(|challenge| get_challenge_progress(pool, &challenge.id)),
    )
    .await?;

    let mut summaries: Vec<ChallengeSummary> = challenges
        .into_iter()
        .zip(progress)
        .map(|(challenge, progress)| ChallengeSummary {
            challenge,
            progress,
        })
        .collect();

    // stable, so the newest-first order survives inside each group
    summaries.sort_by_key(|s| s.progress.is_completed());

    tracing::debug!("loaded {} challenges", summaries.len());
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::FixedClock;
    use crate::db::test_pool;
    use crate::stickers;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn first_sticker_id(pool: &SqlitePool) -> String {
        let packs = stickers::get_packs_with_stickers(pool).await.unwrap();
        packs[0].stickers[0].id.clone()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 1));

        let created = create_challenge(
            &pool,
            &clock,
            NewChallenge::new("  물 마시기 ", "💧", 7).with_reward("케이크"),
        )
        .await
        .unwrap();

        assert_eq!(created.title, "물 마시기");
        let fetched = get_challenge(&pool, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.reward.as_deref(), Some("케이크"));
        assert!(get_challenge(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 1));

        for input in [
            NewChallenge::new("   ", "💧", 7),
            NewChallenge::new("운동", "💪", 0),
            NewChallenge::new("운동", "💪", 366),
            NewChallenge::new("가".repeat(21), "💪", 7),
        ] {
            let err = create_challenge(&pool, &clock, input).await.unwrap_err();
            assert!(matches!(err, Error::InvalidChallenge(_)), "{err}");
        }

        let ok = create_challenge(&pool, &clock, NewChallenge::new("가".repeat(20), "", 365))
            .await
            .unwrap();
        assert_eq!(ok.icon, catalog::DEFAULT_CHALLENGE_ICON);
    }

    #[tokio::test]
    async fn test_get_challenges_newest_first() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 1));

        let older = create_challenge(&pool, &clock, NewChallenge::new("a", "📚", 7))
            .await
            .unwrap();
        clock.advance_days(1);
        let newer = create_challenge(&pool, &clock, NewChallenge::new("b", "📚", 7))
            .await
            .unwrap();

        let ids: Vec<String> = get_challenges(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_update_shrinking_days_removes_latest_logs() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 1));
        let sticker = first_sticker_id(&pool).await;
        let challenge = create_challenge(&pool, &clock, NewChallenge::new("걷기", "🏃‍♂️", 7))
            .await
            .unwrap();

        for day in 1..=5 {
            sticker_logs::add_sticker_log(&pool, &clock, &challenge.id, &sticker, d(2025, 1, day))
                .await
                .unwrap();
        }

        let removed = update_challenge(&pool, &challenge.id, NewChallenge::new("걷기", "🏃‍♂️", 3))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let dates: Vec<NaiveDate> = sticker_logs::get_logs_by_challenge(&pool, &challenge.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.date)
            .collect();
        assert_eq!(dates, vec![d(2025, 1, 1), d(2025, 1, 2), d(2025, 1, 3)]);

        let progress = get_challenge_progress(&pool, &challenge.id).await.unwrap();
        assert_eq!(progress.progress_text, "3 / 3");
        assert!(progress.completed_days <= progress.total_days);

        let grown = update_challenge(&pool, &challenge.id, NewChallenge::new("걷기", "🏃‍♂️", 10))
            .await
            .unwrap();
        assert_eq!(grown, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_edits_all_apply() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("edits.db").display());
        let pool = crate::db::connect(&url).await.unwrap();
        let clock = FixedClock::on(d(2025, 1, 1));
        let sticker = first_sticker_id(&pool).await;
        let challenge = create_challenge(&pool, &clock, NewChallenge::new("걷기", "🏃‍♂️", 30))
            .await
            .unwrap();
        for day in 1..=10 {
            sticker_logs::add_sticker_log(&pool, &clock, &challenge.id, &sticker, d(2025, 1, day))
                .await
                .unwrap();
        }

        let handles: Vec<_> = [21, 14, 7, 30]
            .into_iter()
            .map(|days| {
                let pool = pool.clone();
                let id = challenge.id.clone();
                tokio::spawn(async move {
                    update_challenge(&pool, &id, NewChallenge::new("걷기", "🏃‍♂️", days)).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let logs = sticker_logs::get_logs_by_challenge(&pool, &challenge.id)
            .await
            .unwrap();
        let current = require_challenge(&pool, &challenge.id).await.unwrap();
        assert!(logs.len() as u32 <= current.days);
        // the 7-day edit trimmed whatever ran after it
        assert_eq!(logs.len(), 7);
        assert_eq!(logs.last().unwrap().date, d(2025, 1, 7));
    }

    #[tokio::test]
    async fn test_update_missing_challenge() {
        let pool = test_pool().await;
        let err = update_challenge(&pool, "nope", NewChallenge::new("x", "📚", 7))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChallengeNotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_logs() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 1));
        let sticker = first_sticker_id(&pool).await;
        let challenge = create_challenge(&pool, &clock, NewChallenge::new("독서", "📚", 7))
            .await
            .unwrap();
        sticker_logs::add_sticker_log(&pool, &clock, &challenge.id, &sticker, d(2025, 1, 1))
            .await
            .unwrap();

        delete_challenge(&pool, &challenge.id).await.unwrap();

        assert!(get_challenge(&pool, &challenge.id).await.unwrap().is_none());
        assert!(sticker_logs::get_all_logs(&pool).await.unwrap().is_empty());
        assert!(matches!(
            delete_challenge(&pool, &challenge.id).await,
            Err(Error::ChallengeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_puts_completed_last() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 1));
        let sticker = first_sticker_id(&pool).await;

        let done = create_challenge(&pool, &clock, NewChallenge::new("done", "⭐", 1))
            .await
            .unwrap();
        sticker_logs::add_sticker_log(&pool, &clock, &done.id, &sticker, d(2025, 1, 1))
            .await
            .unwrap();
        let open_old = create_challenge(&pool, &clock, NewChallenge::new("old", "⭐", 7))
            .await
            .unwrap();
        let open_new = create_challenge(&pool, &clock, NewChallenge::new("new", "⭐", 7))
            .await
            .unwrap();

        let list = list_challenges_with_progress(&pool).await.unwrap();
        let ids: Vec<&str> = list.iter().map(|s| s.challenge.id.as_str()).collect();
        assert_eq!(ids, vec![open_new.id.as_str(), open_old.id.as_str(), done.id.as_str()]);
        assert_eq!(list[2].progress.progress_text, "1 / 1");
    }
}
