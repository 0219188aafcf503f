use chrono::{DateTime, Local};
use serde_json::Value;

use crate::error::FormatError;
use crate::market_data::CandleRow;

/// One kline exactly as the exchange sends it: a positional JSON array.
pub type RawCandle = Vec<Value>;

/// Positional field names of a kline, in exchange order.
pub const KLINE_FIELDS: [&str; 12] = [
    "open_time",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "close_time",
    "quote_asset_volume",
    "number_trades",
    "base",
    "quote",
    "unused",
];

/// A kline reduced to the fields the table keeps.
///
/// Array indices:
///   [0] open_time, [1] open, [2] high, [3] low, [4] close, [5] volume,
///   [6] close_time, [7] quote_asset_volume, [8] number_trades,
///   [9] base, [10] quote, [11] unused
///
/// `close_time` is implied by `open_time` and the fixed interval, and the
/// last three positions carry nothing the table uses. They are checked and
/// then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_asset_volume: f64,
    pub number_trades: u64,
}

impl Kline {
    /// Name the fields of the raw kline at `position` in the response.
    pub fn from_fields(position: usize, fields: &[Value]) -> Result<Self, FormatError> {
        if fields.len() != KLINE_FIELDS.len() {
            return Err(FormatError::FieldCount {
                position,
                expected: KLINE_FIELDS.len(),
                actual: fields.len(),
            });
        }

        let price = |i: usize| parse_f64(position, KLINE_FIELDS[i], &fields[i]);
        let millis = |i: usize| parse_i64(position, KLINE_FIELDS[i], &fields[i]);

        let open_time = millis(0)?;
        millis(6)?;

        Ok(Self {
            open_time,
            open: price(1)?,
            high: price(2)?,
            low: price(3)?,
            close: price(4)?,
            volume: price(5)?,
            quote_asset_volume: price(7)?,
            number_trades: fields[8]
                .as_u64()
                .ok_or_else(|| invalid(position, KLINE_FIELDS[8], &fields[8]))?,
        })
    }

    /// Everything but the open time, which becomes the row's index.
    pub fn into_row(self) -> CandleRow {
        CandleRow {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            quote_asset_volume: self.quote_asset_volume,
            number_trades: self.number_trades,
        }
    }
}

/// Epoch milliseconds → calendar time in the process's local zone.
///
/// Sub-second precision is kept, so `1690000000123` maps to the same instant
/// as `1690000000.123` seconds.
pub fn open_time_to_local(position: usize, millis: i64) -> Result<DateTime<Local>, FormatError> {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or(FormatError::Timestamp { position, millis })
}

/// Binance sends prices and volumes as JSON strings; accept plain numbers too.
fn parse_f64(position: usize, field: &'static str, val: &Value) -> Result<f64, FormatError> {
    let parsed = match val {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(position, field, val))
}

fn parse_i64(position: usize, field: &'static str, val: &Value) -> Result<i64, FormatError> {
    val.as_i64().ok_or_else(|| invalid(position, field, val))
}

fn invalid(position: usize, field: &'static str, val: &Value) -> FormatError {
    FormatError::InvalidField {
        position,
        field,
        value: val.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> RawCandle {
        serde_json::from_str(
            r#"[1690000000000, "100.0", "110.0", "95.0", "105.0", "50.0",
                1690000059999, "5250.0", 42, "x", "y", "z"]"#,
        )
        .unwrap()
    }

    #[test]
    fn names_every_field() {
        let k = Kline::from_fields(0, &sample()).unwrap();
        assert_eq!(k.open_time, 1_690_000_000_000);
        assert_eq!(k.open, 100.0);
        assert_eq!(k.high, 110.0);
        assert_eq!(k.low, 95.0);
        assert_eq!(k.close, 105.0);
        assert_eq!(k.volume, 50.0);
        assert_eq!(k.quote_asset_volume, 5250.0);
        assert_eq!(k.number_trades, 42);
    }

    #[test]
    fn numeric_prices_are_accepted() {
        let mut raw = sample();
        raw[1] = json!(100.5);
        let k = Kline::from_fields(0, &raw).unwrap();
        assert_eq!(k.open, 100.5);
    }

    #[test]
    fn short_record_is_rejected() {
        let raw = sample()[..11].to_vec();
        let err = Kline::from_fields(3, &raw).unwrap_err();
        assert!(matches!(
            err,
            FormatError::FieldCount { position: 3, expected: 12, actual: 11 }
        ));
    }

    #[test]
    fn long_record_is_rejected() {
        let mut raw = sample();
        raw.push(json!("extra"));
        assert!(matches!(
            Kline::from_fields(0, &raw),
            Err(FormatError::FieldCount { actual: 13, .. })
        ));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let mut raw = sample();
        raw[4] = json!("abc");
        assert!(matches!(
            Kline::from_fields(0, &raw),
            Err(FormatError::InvalidField { field: "close", .. })
        ));
    }

    #[test]
    fn string_open_time_is_rejected() {
        let mut raw = sample();
        raw[0] = json!("1690000000000");
        assert!(matches!(
            Kline::from_fields(0, &raw),
            Err(FormatError::InvalidField { field: "open_time", .. })
        ));
    }

    #[test]
    fn malformed_close_time_is_rejected_even_though_dropped() {
        let mut raw = sample();
        raw[6] = json!(null);
        assert!(matches!(
            Kline::from_fields(0, &raw),
            Err(FormatError::InvalidField { field: "close_time", .. })
        ));
    }

    #[test]
    fn open_time_matches_seconds_interpretation() {
        let ts = open_time_to_local(0, 1_690_000_000_000).unwrap();
        let expected = Local.timestamp_opt(1_690_000_000, 0).unwrap();
        assert_eq!(ts, expected);
        // Same input, same output.
        assert_eq!(open_time_to_local(0, 1_690_000_000_000).unwrap(), ts);
    }

    #[test]
    fn open_time_keeps_milliseconds() {
        let ts = open_time_to_local(0, 1_690_000_000_250).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_690_000_000_250);
    }

    #[test]
    fn out_of_range_open_time() {
        assert!(matches!(
            open_time_to_local(7, i64::MAX),
            Err(FormatError::Timestamp { position: 7, .. })
        ));
    }
}
