pub mod candle_table;
pub mod formatter;
pub mod kline;

pub use candle_table::{CandleRow, CandleTable, Column};
pub use formatter::format_candles_default;
pub use kline::RawCandle;
