use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::models::StickerType;

pub async fn init_db(config: &Config) -> Result<SqlitePool> {
    let pool = connect(&config.database_url).await?;
    tracing::info!("database ready at {}", config.database_url);
    Ok(pool)
}

/// Opens the store, applies migrations and seeds the built-in pack.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // every connection to :memory: is its own database, so keep exactly one alive
    let in_memory = database_url.contains(":memory:");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    seed_catalog(&pool).await?;

    Ok(pool)
}

/// Inserts the default colour pack when the store has no packs yet.
/// Returns whether anything was written.
pub async fn seed_catalog(pool: &SqlitePool) -> Result<bool> {
    let palette = catalog::DEFAULT_PALETTE;
    let pack_id = uuid::Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;

    // the emptiness check lives in the insert so the transaction writes first
    let inserted = sqlx::query(
        r#"
        INSERT INTO sticker_packs (id, name, description, is_premium, is_custom, price, is_active, created_at)
        SELECT ?1, ?2, ?3, 0, 0, 0, 1, ?4
        WHERE NOT EXISTS (SELECT 1 FROM sticker_packs)
        "#,
    )
    .bind(&pack_id)
    .bind(palette.name)
    .bind(palette.description)
    .bind(chrono::Utc::now())
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if inserted == 0 {
        return Ok(false);
    }

    for &color in palette.colors {
        sqlx::query("INSERT INTO stickers (id, pack_id, name, type, data) VALUES (?1, ?2, ?3, ?4, ?5)")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&pack_id)
            .bind(color)
            .bind(StickerType::Color.as_str())
            .bind(color)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!(
        "seeded sticker pack {:?} with {} stickers",
        palette.name,
        palette.colors.len()
    );

    Ok(true)
}

/// Wipes every row and reseeds the catalog. Developer tooling only.
pub async fn reset_database(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for table in ["daily_sticker_logs", "challenges", "stickers", "sticker_packs"] {
        let deleted = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!("cleared {} rows from {}", deleted, table);
    }
    tx.commit().await?;

    seed_catalog(pool).await?;
    tracing::warn!("database reset");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect("sqlite::memory:")
        .await
        .expect("failed to create in-memory pool")
}
