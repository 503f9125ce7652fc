use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod aggregation;
pub mod board;
pub mod calendar;
pub mod celebration;
pub mod challenges;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod gesture;
pub mod models;
pub mod placement;
pub mod stats;
pub mod sticker_logs;
pub mod stickers;

pub use board::StickerBoard;
pub use config::Config;
pub use dates::{Clock, SystemClock};
pub use error::{Error, Result};

/// Application state handed to every screen by reference.
pub struct App {
    pub pool: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
    selected_challenge: Option<String>,
}

impl App {
    pub async fn open(config: Config) -> Result<Self> {
        let clock = Arc::new(SystemClock::new(config.timezone));
        Self::with_clock(config, clock).await
    }

    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let pool = db::init_db(&config).await?;
        Ok(Self {
            pool,
            clock,
            config,
            selected_challenge: None,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Loads the board of a challenge and remembers it as the one on screen.
    pub async fn open_board(&mut self, challenge_id: &str) -> Result<StickerBoard> {
        let board = StickerBoard::load(self, challenge_id).await?;
        self.selected_challenge = Some(challenge_id.to_string());
        Ok(board)
    }

    pub fn selected_challenge_id(&self) -> Option<&str> {
        self.selected_challenge.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selected_challenge = None;
    }

    pub async fn delete_challenge(&mut self, challenge_id: &str) -> Result<()> {
        challenges::delete_challenge(&self.pool, challenge_id).await?;
        if self.selected_challenge.as_deref() == Some(challenge_id) {
            self.clear_selection();
        }
        Ok(())
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// filter. A subscriber that is already installed is left in place.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
