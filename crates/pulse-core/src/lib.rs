//! Core types and traits for the market pulse system.
//!
//! This crate provides the foundational building blocks including:
//! - Price series types (Bar, TimeSeries, Interval)
//! - Asset universe and cache keys
//! - The error taxonomy shared by every layer
//! - Seams for market data providers and polarity analyzers

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CacheError, DataError, MetricsError, SentimentError};
pub use traits::*;
pub use types::*;
