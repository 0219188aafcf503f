// =============================================================================
// Candle formatter — raw klines → indexed, indicator-augmented table
// =============================================================================
//
// Pipeline (pure, deterministic):
//   1. Name the twelve positional fields of every raw kline.
//   2. Drop close_time and the trailing base / quote / unused fields.
//   3. Convert open_time (epoch ms) to local calendar time.
//   4. Key the rows by that time; it must be strictly increasing.
//   5. Hand the table to the indicator collaborator with the OHLCV bindings
//      below (volume is the quote-asset volume).
// =============================================================================

use tracing::debug;

use super::candle_table::{CandleTable, Column};
use super::kline::{open_time_to_local, Kline, RawCandle};
use crate::error::FormatError;
use crate::indicators::{AllFeatures, ColumnBindings, TechnicalAnalysis};

/// Column roles passed to the indicator collaborator.
pub const FORMAT_BINDINGS: ColumnBindings = ColumnBindings {
    open: Column::Open,
    high: Column::High,
    low: Column::Low,
    close: Column::Close,
    volume: Column::QuoteAssetVolume,
};

/// Format `raw` and augment it with `ta`. Errors from `ta` come back as
/// `FormatError::Indicators` wrapping the collaborator's error unchanged.
pub fn format_candles<T>(raw: &[RawCandle], ta: &T) -> Result<CandleTable, FormatError>
where
    T: TechnicalAnalysis + ?Sized,
{
    let mut entries = Vec::with_capacity(raw.len());
    for (position, fields) in raw.iter().enumerate() {
        let kline = Kline::from_fields(position, fields)?;
        let open_time = open_time_to_local(position, kline.open_time)?;
        entries.push((open_time, kline.into_row()));
    }

    let table = CandleTable::from_entries(entries)?;
    let table = ta.add_features(table, &FORMAT_BINDINGS)?;

    debug!(
        rows = table.len(),
        columns = table.columns().len(),
        "candles formatted"
    );
    Ok(table)
}

/// [`format_candles`] with the full default indicator set.
pub fn format_candles_default(raw: &[RawCandle]) -> Result<CandleTable, FormatError> {
    format_candles(raw, &AllFeatures::default())
}
