// =============================================================================
// Full indicator set
// =============================================================================
//
// Appends volume, volatility, trend, momentum and return columns to a candle
// table. Column names carry their family as a prefix (`volume_`,
// `volatility_`, `trend_`, `momentum_`, `others_`).
// =============================================================================

use tracing::debug;

use super::adx::adx_series;
use super::atr::atr_series;
use super::bollinger::bollinger_series;
use super::ema::{calculate_macd, ema_series};
use super::obv::obv_series;
use super::returns::{cumulative_return, daily_return};
use super::roc::roc_series;
use super::rsi::rsi_series;
use super::{ColumnBindings, TechnicalAnalysis};
use crate::error::IndicatorError;
use crate::market_data::CandleTable;

/// Look-back windows for every indicator in the set.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureParams {
    pub atr_period: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub adx_period: usize,
    pub rsi_period: usize,
    pub roc_period: usize,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            atr_period: 14,
            bollinger_period: 20,
            bollinger_std: 2.0,
            ema_fast: 12,
            ema_slow: 26,
            macd_signal: 9,
            adx_period: 14,
            rsi_period: 14,
            roc_period: 12,
        }
    }
}

/// Column names, in the order they are appended.
pub const FEATURE_COLUMNS: [&str; 16] = [
    "volume_obv",
    "volatility_atr",
    "volatility_bbh",
    "volatility_bbm",
    "volatility_bbl",
    "volatility_bbw",
    "trend_ema_fast",
    "trend_ema_slow",
    "trend_macd",
    "trend_macd_signal",
    "trend_macd_diff",
    "trend_adx",
    "momentum_rsi",
    "momentum_roc",
    "others_dr",
    "others_cr",
];

#[derive(Debug, Clone, Default)]
pub struct AllFeatures {
    pub params: FeatureParams,
}

impl TechnicalAnalysis for AllFeatures {
    fn add_features(
        &self,
        mut table: CandleTable,
        bindings: &ColumnBindings,
    ) -> Result<CandleTable, IndicatorError> {
        let p = &self.params;

        // No indicator in this set reads the open.
        let high = table.series(bindings.high);
        let low = table.series(bindings.low);
        let close = table.series(bindings.close);
        let volume = table.series(bindings.volume);

        let bands = bollinger_series(&close, p.bollinger_period, p.bollinger_std);
        let macd = calculate_macd(&close, p.ema_fast, p.ema_slow, p.macd_signal);

        let columns = [
            obv_series(&close, &volume),
            atr_series(&high, &low, &close, p.atr_period),
            bands.upper,
            bands.middle,
            bands.lower,
            bands.width,
            ema_series(&close, p.ema_fast),
            ema_series(&close, p.ema_slow),
            macd.line,
            macd.signal,
            macd.histogram,
            adx_series(&high, &low, &close, p.adx_period),
            rsi_series(&close, p.rsi_period),
            roc_series(&close, p.roc_period),
            daily_return(&close),
            cumulative_return(&close),
        ];

        for (name, values) in FEATURE_COLUMNS.into_iter().zip(columns) {
            table.push_indicator(name, values)?;
        }

        debug!(
            rows = table.len(),
            volume_column = %bindings.volume,
            added = FEATURE_COLUMNS.len(),
            "indicator columns appended"
        );
        Ok(table)
    }
}
