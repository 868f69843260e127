//! Market data source trait definitions.

use crate::error::DataError;
use crate::types::{Interval, TimeSeries};
use async_trait::async_trait;

/// A single external provider of OHLCV rows.
///
/// Implementations perform exactly one provider call per `fetch`, never
/// retry, and translate every provider failure into a [`DataError`].
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the recent series for a symbol.
    ///
    /// # Arguments
    /// * `symbol` - Provider symbol, e.g. "BTC-USD"
    /// * `interval` - Row interval
    ///
    /// # Returns
    /// A non-empty series ordered from oldest to newest, de-duplicated by
    /// timestamp
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<TimeSeries, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
