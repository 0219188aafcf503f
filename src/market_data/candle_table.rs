use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, IndicatorError};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// The exchange columns kept after formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    QuoteAssetVolume,
    NumberTrades,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
        Column::QuoteAssetVolume,
        Column::NumberTrades,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
            Self::QuoteAssetVolume => "quote_asset_volume",
            Self::NumberTrades => "number_trades",
        }
    }

    fn value(self, row: &CandleRow) -> f64 {
        match self {
            Self::Open => row.open,
            Self::High => row.high,
            Self::Low => row.low,
            Self::Close => row.close,
            Self::Volume => row.volume,
            Self::QuoteAssetVolume => row.quote_asset_volume,
            Self::NumberTrades => row.number_trades as f64,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| IndicatorError::UnknownColumn(s.to_string()))
    }
}

/// One formatted candle, without its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleRow {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_asset_volume: f64,
    pub number_trades: u64,
}

/// A derived column appended after the exchange columns. `None` marks rows
/// where the indicator has not warmed up yet.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// CandleTable
// ---------------------------------------------------------------------------

/// Candles keyed by their local open time, oldest first.
///
/// The index is strictly increasing; every column has one value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleTable {
    index: Vec<DateTime<Local>>,
    rows: Vec<CandleRow>,
    indicators: Vec<IndicatorColumn>,
}

impl CandleTable {
    /// Build a table keyed by `entries`' timestamps. Fails on the first
    /// duplicate or out-of-order timestamp.
    pub fn from_entries(entries: Vec<(DateTime<Local>, CandleRow)>) -> Result<Self, FormatError> {
        let mut index = Vec::with_capacity(entries.len());
        let mut rows = Vec::with_capacity(entries.len());

        for (position, (ts, row)) in entries.into_iter().enumerate() {
            if let Some(prev) = index.last() {
                if ts <= *prev {
                    return Err(FormatError::NonMonotonic {
                        position,
                        previous: prev.timestamp_millis(),
                        current: ts.timestamp_millis(),
                    });
                }
            }
            index.push(ts);
            rows.push(row);
        }

        Ok(Self {
            index,
            rows,
            indicators: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self) -> &[DateTime<Local>] {
        &self.index
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[CandleRow] {
        &self.rows
    }

    /// Look a row up by its open time.
    #[cfg(test)]
    pub fn get(&self, ts: &DateTime<Local>) -> Option<&CandleRow> {
        self.index
            .binary_search(ts)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// All values of an exchange column as `f64`, oldest first.
    pub fn series(&self, column: Column) -> Vec<f64> {
        self.rows.iter().map(|r| column.value(r)).collect()
    }

    /// Column names in display order: exchange columns, then indicators in
    /// the order they were appended.
    pub fn columns(&self) -> Vec<&str> {
        Column::ALL
            .iter()
            .map(|c| c.name())
            .chain(self.indicators.iter().map(|c| c.name.as_str()))
            .collect()
    }

    #[cfg(test)]
    pub fn indicators(&self) -> &[IndicatorColumn] {
        &self.indicators
    }

    #[cfg(test)]
    pub fn indicator(&self, name: &str) -> Option<&[Option<f64>]> {
        self.indicators
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Append a derived column. Its length must match the table.
    pub fn push_indicator(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), IndicatorError> {
        let name = name.into();
        if self.columns().contains(&name.as_str()) {
            return Err(IndicatorError::DuplicateColumn(name));
        }
        if values.len() != self.len() {
            return Err(IndicatorError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.indicators.push(IndicatorColumn { name, values });
        Ok(())
    }

    /// The first `n` rows (or all of them when the table is shorter).
    pub fn head(&self, n: usize) -> CandleTable {
        let n = n.min(self.len());
        Self {
            index: self.index[..n].to_vec(),
            rows: self.rows[..n].to_vec(),
            indicators: self
                .indicators
                .iter()
                .map(|c| IndicatorColumn {
                    name: c.name.clone(),
                    values: c.values[..n].to_vec(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tabular rendering
// ---------------------------------------------------------------------------

impl fmt::Display for CandleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec!["open_time".to_string()];
        header.extend(self.columns().into_iter().map(str::to_string));

        let mut cells: Vec<Vec<String>> = Vec::with_capacity(self.len());
        for (i, (ts, row)) in self.index.iter().zip(&self.rows).enumerate() {
            let mut line = vec![ts.format("%Y-%m-%d %H:%M:%S").to_string()];
            line.extend(Column::ALL.iter().map(|c| match c {
                Column::NumberTrades => row.number_trades.to_string(),
                _ => format!("{:.4}", c.value(row)),
            }));
            line.extend(self.indicators.iter().map(|c| match c.values[i] {
                Some(v) => format!("{v:.4}"),
                None => "NaN".to_string(),
            }));
            cells.push(line);
        }

        let widths: Vec<usize> = (0..header.len())
            .map(|col| {
                cells
                    .iter()
                    .map(|line| line[col].len())
                    .chain(std::iter::once(header[col].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        render_line(f, &header, &widths)?;
        for line in &cells {
            render_line(f, line, &widths)?;
        }
        write!(f, "[{} rows x {} columns]", self.len(), header.len() - 1)
    }
}

fn render_line(f: &mut fmt::Formatter<'_>, line: &[String], widths: &[usize]) -> fmt::Result {
    for (col, cell) in line.iter().enumerate() {
        if col == 0 {
            write!(f, "{cell:<width$}", width = widths[col])?;
        } else {
            write!(f, "  {cell:>width$}", width = widths[col])?;
        }
    }
    writeln!(f)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
