//! Error types for the market pulse core.

use thiserror::Error;

use crate::types::Interval;

/// Market data adapter errors.
///
/// Every provider-specific failure is translated into exactly one of these
/// kinds so callers can react uniformly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Connectivity, timeout, or an unusable response from the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered but returned zero rows.
    #[error("No data returned for {symbol} at {interval}")]
    EmptyResult { symbol: String, interval: Interval },

    /// Asset identifier or interval not recognized by the provider.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl DataError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DataError::Network(_) => "network",
            DataError::EmptyResult { .. } => "empty_result",
            DataError::InvalidParameter(_) => "invalid_parameter",
        }
    }
}

/// Series cache errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The fetch failed and no entry has ever been stored for the key.
    #[error("No cached data for {key} and fetch failed: {source}")]
    MissWithNoFallback {
        key: String,
        #[source]
        source: DataError,
    },

    /// Refreshing a stale entry failed. The stale entry is kept.
    #[error("Refresh of {key} failed: {source}")]
    RefreshFailed {
        key: String,
        #[source]
        source: DataError,
    },
}

impl CacheError {
    /// The adapter failure behind this cache error.
    pub fn data_error(&self) -> &DataError {
        match self {
            CacheError::MissWithNoFallback { source, .. } => source,
            CacheError::RefreshFailed { source, .. } => source,
        }
    }
}

/// Metrics derivation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Cannot derive metrics from an empty series")]
    EmptySeries,
}

/// Sentiment scoring errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SentimentError {
    #[error("No headlines to score")]
    EmptyInput,

    #[error("Analyzer returned invalid polarity {value} for headline {index}")]
    InvalidPolarity { index: usize, value: f64 },
}
