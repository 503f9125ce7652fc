use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, FromRow)]
pub struct ChallengeRow {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub days: i64,
    pub reward: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub icon: String,
    /// Target number of stickers, which is also the number of slots.
    pub days: u32,
    pub reward: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ChallengeRow> for Challenge {
    fn from(row: ChallengeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            icon: row.icon,
            days: u32::try_from(row.days).unwrap_or(0),
            reward: row.reward.filter(|r| !r.is_empty()),
            created_at: row.created_at,
        }
    }
}

/// Form input for creating or editing a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChallenge {
    pub title: String,
    pub icon: String,
    pub days: u32,
    #[serde(default)]
    pub reward: Option<String>,
}

impl NewChallenge {
    pub fn new(title: impl Into<String>, icon: impl Into<String>, days: u32) -> Self {
        Self {
            title: title.into(),
            icon: icon.into(),
            days,
            reward: None,
        }
    }

    pub fn with_reward(mut self, reward: impl Into<String>) -> Self {
        self.reward = Some(reward.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StickerPack {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_uri: Option<String>,
    pub is_premium: bool,
    pub is_custom: bool,
    pub created_by: Option<String>,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickerType {
    Color,
    Image,
    Custom,
}

impl StickerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StickerType::Color => "color",
            StickerType::Image => "image",
            StickerType::Custom => "custom",
        }
    }
}

impl fmt::Display for StickerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StickerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "color" => Ok(StickerType::Color),
            "image" => Ok(StickerType::Image),
            "custom" => Ok(StickerType::Custom),
            other => Err(Error::UnknownStickerType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StickerRow {
    pub id: String,
    pub pack_id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sticker {
    pub id: String,
    pub pack_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StickerType,
    /// Hex colour for colour stickers, otherwise an image uri.
    pub data: String,
}

impl TryFrom<StickerRow> for Sticker {
    type Error = Error;

    fn try_from(row: StickerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: row.kind.parse()?,
            id: row.id,
            pack_id: row.pack_id,
            name: row.name,
            data: row.data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StickerPackWithStickers {
    pub pack: StickerPack,
    pub stickers: Vec<Sticker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DailyStickerLog {
    pub id: String,
    pub challenge_id: String,
    pub sticker_id: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeProgress {
    pub total_days: u32,
    pub completed_days: u32,
    pub progress_text: String,
}

impl ChallengeProgress {
    pub fn new(total_days: u32, completed_days: u32) -> Self {
        Self {
            total_days,
            completed_days,
            progress_text: format!("{completed_days} / {total_days}"),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_days >= self.total_days
    }

    pub fn fraction(&self) -> f64 {
        if self.total_days == 0 {
            return 0.0;
        }
        (self.completed_days as f64 / self.total_days as f64).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeSummary {
    pub challenge: Challenge,
    pub progress: ChallengeProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub logs: Vec<DailyStickerLog>,
    pub total_stickers: u32,
}

/// Totals derived from the logs on every read. Nothing here is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UserStats {
    pub total_stickers: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_challenges: u32,
}
