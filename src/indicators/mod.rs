// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator series. Every function returns one
// `Option<f64>` per input row: `None` until the look-back window is filled,
// and `None` from the first non-finite intermediate value onwards.
//
// `TechnicalAnalysis` is the seam the candle formatter calls into; the
// `features::AllFeatures` implementation appends the full indicator set.
// =============================================================================

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod features;
pub mod obv;
pub mod returns;
pub mod roc;
pub mod rsi;

pub use features::AllFeatures;

use crate::error::IndicatorError;
use crate::market_data::{CandleTable, Column};

/// Which table column plays which OHLCV role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBindings {
    pub open: Column,
    pub high: Column,
    pub low: Column,
    pub close: Column,
    pub volume: Column,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self {
            open: Column::Open,
            high: Column::High,
            low: Column::Low,
            close: Column::Close,
            volume: Column::Volume,
        }
    }
}

/// Takes an OHLCV table and hands it back with indicator columns appended.
pub trait TechnicalAnalysis {
    fn add_features(
        &self,
        table: CandleTable,
        bindings: &ColumnBindings,
    ) -> Result<CandleTable, IndicatorError>;
}

/// Wilder's true range for one bar.
pub(crate) fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}
