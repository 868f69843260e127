//! CSV data source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use pulse_core::error::DataError;
use pulse_core::traits::MarketDataSource;
use pulse_core::types::{Bar, Interval, TimeSeries};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::normalize::{build_series, validate_symbol};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "Datetime"
    )]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Offline data source reading `{dir}/{SYMBOL}_{interval}.csv`.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    /// Create a new CSV data source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the rows for a symbol and interval.
    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", symbol, interval))
    }
}

#[async_trait]
impl MarketDataSource for CsvSource {
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<TimeSeries, DataError> {
        validate_symbol(symbol)?;

        let path = self.path_for(symbol, interval);
        if !path.is_file() {
            return Err(DataError::InvalidParameter(format!(
                "no data file for {} at {} ({})",
                symbol,
                interval,
                path.display()
            )));
        }

        debug!(symbol, %interval, path = %path.display(), "reading csv");
        let rows = tokio::task::spawn_blocking(move || load_rows(&path))
            .await
            .map_err(|e| DataError::Network(format!("csv reader task failed: {}", e)))??;

        build_series(symbol, interval, rows)
    }

    fn name(&self) -> &str {
        "CSV"
    }
}

/// Load raw rows from a CSV file.
fn load_rows(path: &Path) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Network(e.to_string()))?;

    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| DataError::Network(e.to_string()))?;

        let timestamp = parse_timestamp(&record.date)?;

        rows.push(Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    Ok(rows)
}

/// Parse various timestamp formats into Unix milliseconds.
///
/// Times before the Unix epoch or beyond the millisecond range are rejected.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let millis = parse_millis(date_str)
        .ok_or_else(|| DataError::Network(format!("could not parse date: {}", date_str)))?;

    if millis < 0 {
        return Err(DataError::Network(format!(
            "date before the Unix epoch: {}",
            date_str
        )));
    }
    Ok(millis)
}

fn parse_millis(date_str: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.timestamp_millis());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Some(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Unix timestamp, milliseconds if > 10 digits
    let ts = date_str.parse::<i64>().ok()?;
    if ts > 10_000_000_000 {
        Some(ts)
    } else {
        ts.checked_mul(1000)
    }
}
