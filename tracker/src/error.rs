use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("challenge {0} not found")]
    ChallengeNotFound(String),
    #[error("sticker {0} not found")]
    StickerNotFound(String),
    #[error("challenge {challenge_id} already has a sticker on {date}")]
    AlreadyPlaced {
        challenge_id: String,
        date: NaiveDate,
    },
    #[error("challenge {challenge_id} has no sticker on {date}")]
    LogNotFound {
        challenge_id: String,
        date: NaiveDate,
    },
    #[error("challenge {0} has no open slot left")]
    ChallengeFull(String),
    #[error("invalid challenge: {0}")]
    InvalidChallenge(String),
    #[error("only today's sticker can be removed")]
    NotRemovable,
    #[error("no sticker selected for today")]
    NoStickerSelected,
    #[error("unknown sticker type {0:?}")]
    UnknownStickerType(String),
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Expected conditions the user can act on. They are shown as a notice
    /// and never abort the interaction that caused them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::AlreadyPlaced { .. }
                | Error::LogNotFound { .. }
                | Error::ChallengeFull(_)
                | Error::NotRemovable
                | Error::NoStickerSelected
                | Error::InvalidChallenge(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
