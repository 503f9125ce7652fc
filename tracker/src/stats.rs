use sqlx::sqlite::SqlitePool;

use crate::aggregation::{current_streak, longest_streak};
use crate::calendar::get_active_dates;
use crate::dates::Clock;
use crate::error::Result;
use crate::models::UserStats;

pub async fn get_user_stats(pool: &SqlitePool, clock: &dyn Clock) -> Result<UserStats> {
    let today = clock.today();

    let total_stickers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_sticker_logs")
        .fetch_one(pool)
        .await?;
    let total_challenges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM challenges")
        .fetch_one(pool)
        .await?;
    let dates = get_active_dates(pool, today).await?;

    let stats = UserStats {
        total_stickers: total_stickers as u32,
        current_streak: current_streak(&dates, today),
        longest_streak: longest_streak(&dates),
        total_challenges: total_challenges as u32,
    };
    tracing::debug!(?stats, "computed user stats");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::{create_challenge, delete_challenge};
    use crate::dates::FixedClock;
    use crate::db::test_pool;
    use crate::models::NewChallenge;
    use crate::sticker_logs::add_sticker_log;
    use crate::stickers;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_empty_store() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 5));
        assert_eq!(get_user_stats(&pool, &clock).await.unwrap(), UserStats::default());
    }

    #[tokio::test]
    async fn test_stats_follow_logs() {
        let pool = test_pool().await;
        let clock = FixedClock::on(d(2025, 1, 10));
        let sticker = stickers::get_packs_with_stickers(&pool).await.unwrap()[0].stickers[0]
            .id
            .clone();
        let a = create_challenge(&pool, &clock, NewChallenge::new("a", "📚", 30))
            .await
            .unwrap();
        let b = create_challenge(&pool, &clock, NewChallenge::new("b", "💧", 30))
            .await
            .unwrap();

        for day in [1, 2, 3, 4, 8, 9, 10] {
            add_sticker_log(&pool, &clock, &a.id, &sticker, d(2025, 1, day))
                .await
                .unwrap();
        }
        add_sticker_log(&pool, &clock, &b.id, &sticker, d(2025, 1, 10))
            .await
            .unwrap();

        let stats = get_user_stats(&pool, &clock).await.unwrap();
        assert_eq!(stats.total_stickers, 8);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 4);
        assert_eq!(stats.total_challenges, 2);

        // deleting a challenge takes its logs with it
        delete_challenge(&pool, &a.id).await.unwrap();
        let stats = get_user_stats(&pool, &clock).await.unwrap();
        assert_eq!(stats.total_stickers, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.total_challenges, 1);
    }
}
