//! Tradable assets and cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Interval;

/// A tradable asset: display name plus provider symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Human readable name, e.g. "Bitcoin"
    pub name: String,
    /// Provider symbol, e.g. "BTC-USD"
    pub symbol: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// The fixed set of assets the application offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetUniverse {
    assets: Vec<Asset>,
}

impl AssetUniverse {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    /// Find an asset by display name or provider symbol, ignoring case.
    pub fn resolve(&self, query: &str) -> Option<&Asset> {
        let query = query.trim();
        self.assets.iter().find(|a| {
            a.name.eq_ignore_ascii_case(query) || a.symbol.eq_ignore_ascii_case(query)
        })
    }

    /// Get all assets in configuration order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Cache key: provider symbol plus interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub symbol: String,
    pub interval: Interval,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.interval)
    }
}
