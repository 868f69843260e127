//! Latest price, trailing change and range over a time window.

use chrono::Duration;
use pulse_core::error::MetricsError;
use pulse_core::types::TimeSeries;
use serde::{Deserialize, Serialize};

/// Summary values for one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Close of the last row
    pub last_price: f64,
    /// Percent change from the first close in the window to the last close
    pub change_pct: f64,
    /// Highest high in the window
    pub high: f64,
    /// Lowest low in the window
    pub low: f64,
    /// Total volume in the window
    pub volume: f64,
    /// Timestamp (Unix ms) of the first row in the window
    pub window_start: i64,
    /// Timestamp (Unix ms) of the last row
    pub as_of: i64,
    /// Number of rows in the window
    pub window_rows: usize,
}

/// Computes [`DerivedMetrics`] over a trailing window.
///
/// The window holds every row whose timestamp is at least
/// `last.timestamp - window`. A series shorter than the window therefore
/// uses all of its rows. When bars are spaced wider than the window, the
/// window holds the last two rows.
#[derive(Debug, Clone, Copy)]
pub struct MetricsDeriver {
    window: Duration,
}

impl Default for MetricsDeriver {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

impl MetricsDeriver {
    /// Create a deriver with a custom window.
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Derive metrics from `series`.
    pub fn derive(&self, series: &TimeSeries) -> Result<DerivedMetrics, MetricsError> {
        let rows = series.rows();
        let last = rows.last().ok_or(MetricsError::EmptySeries)?;

        let cutoff = last.timestamp.saturating_sub(self.window.num_milliseconds());
        // Rows are sorted, so the window is a suffix. It always reaches back
        // to the previous row so bars coarser than the window still compare.
        let start = rows
            .partition_point(|b| b.timestamp < cutoff)
            .min(rows.len().saturating_sub(2));
        let window = &rows[start..];
        let first = &window[0];

        let change_pct = if first.close == 0.0 {
            0.0
        } else {
            (last.close - first.close) / first.close * 100.0
        };

        let (high, low, volume) = window.iter().fold(
            (f64::NEG_INFINITY, f64::INFINITY, 0.0),
            |(high, low, volume), b| (high.max(b.high), low.min(b.low), volume + b.volume),
        );

        Ok(DerivedMetrics {
            last_price: last.close,
            change_pct,
            high,
            low,
            volume,
            window_start: first.timestamp,
            as_of: last.timestamp,
            window_rows: window.len(),
        })
    }
}

/// Derive metrics over the trailing 24 hours.
pub fn derive(series: &TimeSeries) -> Result<DerivedMetrics, MetricsError> {
    MetricsDeriver::default().derive(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::types::{Bar, Interval};

    const HOUR: i64 = 3_600_000;
    const T0: i64 = 1_700_000_000_000;

    fn series(rows: Vec<Bar>) -> TimeSeries {
        TimeSeries::new("BTC-USD", Interval::Hour1, rows)
    }

    fn flat(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close, close, close, 1.0)
    }

    #[test]
    fn test_empty_series_fails() {
        let empty = TimeSeries::empty("BTC-USD", Interval::Hour1);
        assert_eq!(derive(&empty), Err(MetricsError::EmptySeries));
    }

    #[test]
    fn test_single_row() {
        let m = derive(&series(vec![flat(T0, 250.0)])).unwrap();
        assert_eq!(m.change_pct, 0.0);
        assert_eq!(m.last_price, 250.0);
        assert_eq!(m.high, 250.0);
        assert_eq!(m.low, 250.0);
        assert_eq!(m.window_rows, 1);
    }

    #[test]
    fn test_under_24h_uses_whole_series() {
        let m = derive(&series(vec![flat(T0, 100.0), flat(T0 + 23 * HOUR, 110.0)])).unwrap();
        assert!((m.change_pct - 10.0).abs() < 1e-9);
        assert_eq!(m.window_start, T0);
        assert_eq!(m.window_rows, 2);
    }

    #[test]
    fn test_window_excludes_older_rows() {
        let rows = vec![
            Bar::new(T0, 50.0, 500.0, 1.0, 50.0, 10.0),
            Bar::new(T0 + 10 * HOUR, 100.0, 120.0, 95.0, 100.0, 1.0),
            Bar::new(T0 + 20 * HOUR, 100.0, 130.0, 90.0, 110.0, 2.0),
            Bar::new(T0 + 34 * HOUR, 110.0, 125.0, 105.0, 120.0, 3.0),
        ];
        let m = derive(&series(rows)).unwrap();

        // Cutoff is T0 + 10h, inclusive.
        assert_eq!(m.window_start, T0 + 10 * HOUR);
        assert_eq!(m.window_rows, 3);
        assert!((m.change_pct - 20.0).abs() < 1e-9);
        assert_eq!(m.high, 130.0);
        assert_eq!(m.low, 90.0);
        assert_eq!(m.volume, 6.0);
        assert_eq!(m.as_of, T0 + 34 * HOUR);
    }

    #[test]
    fn test_daily_bars_compare_to_previous_day() {
        let day = 24 * HOUR;
        let rows = vec![flat(T0, 80.0), flat(T0 + day, 100.0), flat(T0 + 2 * day, 95.0)];
        let m = derive(&series(rows)).unwrap();
        assert_eq!(m.window_rows, 2);
        assert!((m.change_pct + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_bars_keep_previous_row() {
        let rows = vec![flat(T0, 40.0), flat(T0 + 72 * HOUR, 50.0), flat(T0 + 144 * HOUR, 60.0)];
        let m = derive(&series(rows)).unwrap();
        assert_eq!(m.window_rows, 2);
        assert_eq!(m.window_start, T0 + 72 * HOUR);
        assert!((m.change_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_first_close_gives_zero_change() {
        let m = derive(&series(vec![flat(T0, 0.0), flat(T0 + HOUR, 5.0)])).unwrap();
        assert_eq!(m.change_pct, 0.0);
        assert_eq!(m.last_price, 5.0);
    }

    #[test]
    fn test_custom_window() {
        let rows = vec![flat(T0, 100.0), flat(T0 + HOUR, 200.0), flat(T0 + 2 * HOUR, 300.0)];
        let m = MetricsDeriver::new(Duration::hours(1)).derive(&series(rows)).unwrap();
        assert_eq!(m.window_rows, 2);
        assert!((m.change_pct - 50.0).abs() < 1e-9);
    }
}
