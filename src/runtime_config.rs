// =============================================================================
// Runtime Configuration — feed settings with serde defaults
// =============================================================================
//
// Every field carries `#[serde(default)]` so a partial (or empty) JSON file
// still loads. A missing file is not fatal: the entry point falls back to the
// defaults with a warning. Selected fields can be overridden from the
// environment after the file is read.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Largest `limit` the klines endpoint accepts.
pub const MAX_CANDLE_LIMIT: u32 = 1000;

pub const ENV_SYMBOL: &str = "CANDLE_FEED_SYMBOL";
pub const ENV_BASE_URL: &str = "CANDLE_FEED_BASE_URL";
pub const ENV_KEYS_PATH: &str = "CANDLE_FEED_KEYS_PATH";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_base_url() -> String {
    "https://api.binance.us/api/v3/".to_string()
}

fn default_symbol() -> String {
    "ETHUSDT".to_string()
}

fn default_candle_limit() -> u32 {
    1000
}

fn default_preview_rows() -> usize {
    20
}

fn default_keys_path() -> PathBuf {
    PathBuf::from("../secret/secret.json")
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_retry_backoff_ms() -> u64 {
    500
}

// =============================================================================
// FeedConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// REST root, e.g. `https://api.binance.us/api/v3/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Number of one-minute candles requested.
    #[serde(default = "default_candle_limit")]
    pub candle_limit: u32,

    /// Rows of the formatted table printed by the entry point.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    #[serde(default = "default_keys_path")]
    pub keys_path: PathBuf,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Allow one extra attempt after a timeout or refused connection.
    #[serde(default)]
    pub retry_transient: bool,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            symbol: default_symbol(),
            candle_limit: default_candle_limit(),
            preview_rows: default_preview_rows(),
            keys_path: default_keys_path(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_transient: false,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl FeedConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feed config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse feed config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.symbol,
            candle_limit = config.candle_limit,
            "feed config loaded"
        );

        Ok(config)
    }

    /// Apply `CANDLE_FEED_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(symbol) = lookup(ENV_SYMBOL) {
            let symbol = symbol.trim().to_uppercase();
            if !symbol.is_empty() {
                self.symbol = symbol;
            }
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        if let Some(path) = lookup(ENV_KEYS_PATH) {
            if !path.trim().is_empty() {
                self.keys_path = PathBuf::from(path.trim());
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if !(1..=MAX_CANDLE_LIMIT).contains(&self.candle_limit) {
            return Err(ConfigError::Invalid(format!(
                "candle_limit must be within 1..={MAX_CANDLE_LIMIT}, got {}",
                self.candle_limit
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
