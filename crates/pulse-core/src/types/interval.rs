//! Bar interval definitions.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interval between consecutive rows of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Interval {
    /// 1 minute bars
    #[serde(rename = "1m")]
    Minute1,
    /// 5 minute bars
    #[serde(rename = "5m")]
    Minute5,
    /// 1 hour bars
    #[serde(rename = "1h")]
    Hour1,
    /// Daily bars
    #[serde(rename = "1d")]
    #[default]
    Daily,
}

impl Interval {
    /// How far back a single fetch reaches for this interval.
    ///
    /// Providers cap intraday history, so fine intervals get a short range.
    pub fn lookback(&self) -> Duration {
        match self {
            Interval::Minute1 | Interval::Minute5 => Duration::days(7),
            Interval::Hour1 => Duration::days(60),
            Interval::Daily => Duration::days(365),
        }
    }

    /// Lookback expressed as a provider range token (`7d`, `60d`, `1y`).
    pub fn range_token(&self) -> &'static str {
        match self {
            Interval::Minute1 | Interval::Minute5 => "7d",
            Interval::Hour1 => "60d",
            Interval::Daily => "1y",
        }
    }

    /// Get all available intervals.
    pub fn all() -> &'static [Interval] {
        &[
            Interval::Minute1,
            Interval::Minute5,
            Interval::Hour1,
            Interval::Daily,
        ]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Hour1 => "1h",
            Interval::Daily => "1d",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "1min" | "minute" => Ok(Interval::Minute1),
            "5m" | "5min" | "five-minute" => Ok(Interval::Minute5),
            "1h" | "1hour" | "hour" => Ok(Interval::Hour1),
            "1d" | "day" | "daily" => Ok(Interval::Daily),
            _ => Err(format!("Invalid interval: {}", s)),
        }
    }
}
