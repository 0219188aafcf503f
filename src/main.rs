// =============================================================================
// Candle Feed — Main Entry Point
// =============================================================================
//
// Loads keys, pulls one-minute candles for the configured symbol, formats
// them into an indicator-augmented table and prints a preview, the keys and
// the live price. Each step is awaited in turn; any failure ends the run with
// a non-zero exit code.
//
// The keys are printed through their `Display` impl, which shows the public
// key and prints `<redacted>` in place of the secret.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod binance;
mod error;
mod indicators;
mod keys;
mod market_data;
mod runtime_config;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::binance::MarketDataClient;
use crate::keys::Keys;
use crate::market_data::format_candles_default;
use crate::runtime_config::FeedConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = FeedConfig::load("feed_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        FeedConfig::default()
    });
    config.apply_env_overrides();
    config.validate()?;

    info!(
        symbol = %config.symbol,
        candle_limit = config.candle_limit,
        "candle feed starting"
    );

    // ── 2. Credentials ───────────────────────────────────────────────────
    let keys = Keys::load(&config.keys_path)?;

    // ── 3. Candles → table ───────────────────────────────────────────────
    let client = MarketDataClient::new(&config)?;
    info!(base_url = client.base_url(), "market data client ready");
    let raw = client
        .fetch_candles(&config.symbol, config.candle_limit)
        .await?;
    let table = format_candles_default(&raw)?;
    if table.is_empty() {
        warn!(symbol = %config.symbol, "exchange returned no candles");
    }
    if let (Some(first), Some(last)) = (table.index().first(), table.index().last()) {
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            first = %first,
            last = %last,
            "table ready"
        );
    }

    println!("{}", table.head(config.preview_rows));

    // ── 4. Keys and live price ───────────────────────────────────────────
    println!("{keys}");

    let quote = client.fetch_price(&config.symbol).await?;
    println!("{}", quote.price);

    Ok(())
}
