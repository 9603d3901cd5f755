//! Configuration file parser (TOML).
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`, which polls the two stock feeds once a day.
//! Unknown keys are accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FetcherSettings, DEFAULT_MAX_FEED_BYTES};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value parsed but makes no sense (zero interval, empty label, ...).
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// One feed to poll: a display label and the feed URL.
///
/// The label is stored verbatim as each article's `source`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSource {
    pub label: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the `Articles` collection.
    pub database_path: PathBuf,

    /// Hours between scheduled runs.
    pub interval_hours: u64,

    /// Per-feed request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Largest feed body accepted, in bytes.
    pub max_feed_bytes: usize,

    /// Maximum article writes in flight per feed.
    pub write_concurrency: usize,

    /// `User-Agent` header sent to feed servers.
    pub user_agent: String,

    /// Feeds to poll, in order.
    pub feeds: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("articles.db"),
            interval_hours: 24,
            request_timeout_secs: 30,
            max_feed_bytes: DEFAULT_MAX_FEED_BYTES,
            write_concurrency: 16,
            user_agent: FetcherSettings::default().user_agent,
            feeds: vec![
                FeedSource::new(
                    "Yahoo news",
                    "https://news.yahoo.co.jp/rss/topics/top-picks.xml",
                ),
                FeedSource::new("Netlab", "https://rss.itmedia.co.jp/rss/2.0/netlab.xml"),
            ],
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Longest accepted run interval (one year). Larger periods overflow the
    /// timer's deadline arithmetic.
    pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

    const KNOWN_KEYS: [&'static str; 7] = [
        "database_path",
        "interval_hours",
        "request_timeout_secs",
        "max_feed_bytes",
        "write_concurrency",
        "user_agent",
        "feeds",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Zero interval/timeout/concurrency, an interval over [`Self::MAX_INTERVAL_HOURS`]
    ///   or a blank feed label → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            interval_hours = config.interval_hours,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text. Blank text yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_hours == 0 {
            return Err(ConfigError::Invalid("interval_hours must be at least 1".into()));
        }
        if self.interval_hours > Self::MAX_INTERVAL_HOURS {
            return Err(ConfigError::Invalid(format!(
                "interval_hours must be at most {}",
                Self::MAX_INTERVAL_HOURS
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        if self.write_concurrency == 0 {
            return Err(ConfigError::Invalid("write_concurrency must be at least 1".into()));
        }
        if let Some(feed) = self.feeds.iter().find(|f| f.label.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "feed '{}' has an empty label",
                feed.url
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(3600))
    }

    /// Fetcher settings derived from this config.
    pub fn fetcher_settings(&self) -> FetcherSettings {
        FetcherSettings {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_feed_bytes: self.max_feed_bytes,
            user_agent: self.user_agent.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
