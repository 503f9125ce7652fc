use futures::future::try_join_all;
use sqlx::sqlite::SqlitePool;

use crate::error::Result;
use crate::models::{Sticker, StickerPack, StickerPackWithStickers, StickerRow};

const PACK_COLUMNS: &str = "id, name, description, thumbnail_uri, is_premium, is_custom, created_by, price, is_active, created_at";

/// Active packs, newest first.
pub async fn get_sticker_packs(pool: &SqlitePool) -> Result<Vec<StickerPack>> {
    let packs = sqlx::query_as::<_, StickerPack>(&format!(
        "SELECT {PACK_COLUMNS} FROM sticker_packs WHERE is_active = 1 ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(packs)
}

pub async fn get_stickers_by_pack(pool: &SqlitePool, pack_id: &str) -> Result<Vec<Sticker>> {
    let rows = sqlx::query_as::<_, StickerRow>(
        "SELECT id, pack_id, name, type, data FROM stickers WHERE pack_id = ?1 ORDER BY name",
    )
    .bind(pack_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Sticker::try_from).collect()
}

pub async fn get_sticker(pool: &SqlitePool, id: &str) -> Result<Option<Sticker>> {
    let row = sqlx::query_as::<_, StickerRow>(
        "SELECT id, pack_id, name, type, data FROM stickers WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Sticker::try_from).transpose()
}

pub async fn get_packs_with_stickers(pool: &SqlitePool) -> Result<Vec<StickerPackWithStickers>> {
    let packs = get_sticker_packs(pool).await?;

    let stickers =
        try_join_all(packs.iter().map(|pack| get_stickers_by_pack(pool, &pack.id))).await?;

    let packs: Vec<StickerPackWithStickers> = packs
        .into_iter()
        .zip(stickers)
        .map(|(pack, stickers)| StickerPackWithStickers { pack, stickers })
        .collect();

    tracing::debug!("loaded {} sticker packs", packs.len());
    Ok(packs)
}
