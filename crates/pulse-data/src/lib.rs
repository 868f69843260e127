//! Market data access: a TTL series cache and the provider adapters behind it.

mod cache;
mod coingecko;
mod csv_source;
mod normalize;
mod service;
mod yahoo;

pub use cache::{CacheEntry, SeriesCache, DEFAULT_TTL};
pub use coingecko::{ohlc_days, CoinGeckoConfig, CoinGeckoSource, COINGECKO_BASE_URL};
pub use csv_source::CsvSource;
pub use service::SeriesService;
pub use yahoo::{YahooChartSource, YahooConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
