//! Core traits.

mod analyzer;
mod data_source;

pub use analyzer::PolarityAnalyzer;
pub use data_source::MarketDataSource;
