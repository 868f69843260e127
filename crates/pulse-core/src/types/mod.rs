//! Core data types.

mod asset;
mod interval;
mod ohlcv;

pub use asset::{Asset, AssetUniverse, CacheKey};
pub use interval::Interval;
pub use ohlcv::{Bar, TimeSeries};
