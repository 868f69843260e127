//! Cache plus source composition used by callers.

use pulse_core::error::CacheError;
use pulse_core::traits::MarketDataSource;
use pulse_core::types::{CacheKey, Interval, TimeSeries};
use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheEntry, SeriesCache};

/// Read-through access to one market data source.
#[derive(Clone)]
pub struct SeriesService {
    cache: Arc<SeriesCache>,
    source: Arc<dyn MarketDataSource>,
}

impl SeriesService {
    pub fn new(cache: Arc<SeriesCache>, source: Arc<dyn MarketDataSource>) -> Self {
        Self { cache, source }
    }

    /// Series for a symbol, served from cache while fresh.
    pub async fn series(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Arc<TimeSeries>, CacheError> {
        let key = CacheKey::new(symbol, interval);
        self.cache.get_from(&key, self.source.as_ref()).await
    }

    /// Drop the cached entry and fetch again.
    pub async fn refresh(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Arc<TimeSeries>, CacheError> {
        let key = CacheKey::new(symbol, interval);
        self.cache.invalidate(&key);
        info!(key = %key, source = self.source.name(), "manual refresh");
        self.cache.get_from(&key, self.source.as_ref()).await
    }

    /// Drop every cached entry. The next request per key fetches.
    pub fn refresh_all(&self) {
        self.cache.invalidate_all();
        info!(source = self.source.name(), "all cached series invalidated");
    }

    /// Current entry for a symbol, if any, without fetching.
    pub async fn cached(&self, symbol: &str, interval: Interval) -> Option<CacheEntry> {
        self.cache.peek(&CacheKey::new(symbol, interval)).await
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}
