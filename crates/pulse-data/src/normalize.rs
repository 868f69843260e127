//! Shared row normalization for adapters.

use pulse_core::error::DataError;
use pulse_core::types::{Bar, Interval, TimeSeries};
use tracing::warn;

/// Turn raw provider rows into a series.
///
/// Rows with negative or non-finite fields are dropped. The result is sorted
/// and de-duplicated by timestamp. No usable rows is an `EmptyResult`.
pub(crate) fn build_series(
    symbol: &str,
    interval: Interval,
    raw: Vec<Bar>,
) -> Result<TimeSeries, DataError> {
    let total = raw.len();
    let rows: Vec<Bar> = raw.into_iter().filter(Bar::is_valid).collect();

    let dropped = total - rows.len();
    if dropped > 0 {
        warn!(symbol, %interval, dropped, total, "dropped malformed provider rows");
    }

    if rows.is_empty() {
        return Err(DataError::EmptyResult {
            symbol: symbol.to_string(),
            interval,
        });
    }

    Ok(TimeSeries::new(symbol, interval, rows))
}

/// Reject identifiers that no provider could accept.
pub(crate) fn validate_symbol(symbol: &str) -> Result<(), DataError> {
    let valid = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '=' | '^' | '_'));
    if valid {
        Ok(())
    } else {
        Err(DataError::InvalidParameter(format!(
            "unrecognized asset identifier '{}'",
            symbol
        )))
    }
}
