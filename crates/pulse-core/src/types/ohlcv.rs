//! OHLCV (Open, High, Low, Close, Volume) series types.

use serde::{Deserialize, Serialize};

use super::Interval;

/// One row of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume (0 when the provider does not report it)
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Timestamp and all prices are non-negative, prices are finite.
    pub fn is_valid(&self) -> bool {
        self.timestamp >= 0
            && [self.open, self.high, self.low, self.close, self.volume]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Ordered rows for one (asset, interval) pair.
///
/// Rows are strictly increasing by timestamp. A series may be empty, which
/// is the explicit "no data" state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Provider symbol
    pub symbol: String,
    /// Interval of the rows
    pub interval: Interval,
    rows: Vec<Bar>,
}

impl TimeSeries {
    /// Build a series, sorting rows by timestamp and dropping duplicate
    /// timestamps. When a timestamp repeats, the row seen last wins.
    pub fn new(symbol: impl Into<String>, interval: Interval, rows: Vec<Bar>) -> Self {
        let mut indexed: Vec<(usize, Bar)> = rows.into_iter().enumerate().collect();
        // Stable order for equal timestamps: later input position last.
        indexed.sort_by_key(|(pos, bar)| (bar.timestamp, *pos));

        let mut rows: Vec<Bar> = Vec::with_capacity(indexed.len());
        for (_, bar) in indexed {
            match rows.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => rows.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            interval,
            rows,
        }
    }

    /// Create an empty series.
    pub fn empty(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            rows: Vec::new(),
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, oldest first.
    pub fn rows(&self) -> &[Bar] {
        &self.rows
    }

    /// Get the first row.
    pub fn first(&self) -> Option<&Bar> {
        self.rows.first()
    }

    /// Get the last row.
    pub fn last(&self) -> Option<&Bar> {
        self.rows.last()
    }

    /// Get the last N rows.
    pub fn tail(&self, n: usize) -> &[Bar] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    /// Get an iterator over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.rows.iter()
    }
}
