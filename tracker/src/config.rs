use chrono_tz::Tz;

use crate::error::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://praise_sticker.db";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;
pub const DEFAULT_LOG_FILTER: &str = "praise_sticker=debug";

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const TIMEZONE_VAR: &str = "PRAISE_STICKER_TZ";
pub const LOG_FILTER_VAR: &str = "PRAISE_STICKER_LOG";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Zone that decides which calendar day "today" is.
    pub timezone: Tz,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment. Callers load `.env` first.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            if !url.starts_with("sqlite:") {
                return Err(Error::Config(format!(
                    "{DATABASE_URL_VAR} must be a sqlite url, got {url:?}"
                )));
            }
            config.database_url = url;
        }

        if let Some(tz) = lookup(TIMEZONE_VAR).filter(|v| !v.trim().is_empty()) {
            config.timezone = tz
                .trim()
                .parse::<Tz>()
                .map_err(|e| Error::Config(format!("{TIMEZONE_VAR}={tz:?}: {e}")))?;
        }

        if let Some(filter) = lookup(LOG_FILTER_VAR).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }
}
