//! Yahoo Finance chart API adapter.

use async_trait::async_trait;
use pulse_core::error::DataError;
use pulse_core::traits::MarketDataSource;
use pulse_core::types::{Bar, Interval, TimeSeries};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::normalize::{build_series, validate_symbol};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; pulse/0.1)";

/// Yahoo chart API configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Transport-level timeout for one request
    pub request_timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Market data from the Yahoo chart endpoint.
pub struct YahooChartSource {
    config: YahooConfig,
    client: Client,
}

impl YahooChartSource {
    /// Create a new client.
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DataError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

#[async_trait]
impl MarketDataSource for YahooChartSource {
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<TimeSeries, DataError> {
        validate_symbol(symbol)?;

        let url = self.chart_url(symbol);
        let params = [
            ("interval", interval.to_string()),
            ("range", interval.range_token().to_string()),
            ("includePrePost", "false".to_string()),
        ];
        debug!(symbol, %interval, url = %url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        parse_chart_response(symbol, interval, status, &body)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}

/// Translate a chart response into a series or a classified error.
///
/// Yahoo reports errors in the body for non-2xx statuses too, so the body is
/// inspected before the status.
fn parse_chart_response(
    symbol: &str,
    interval: Interval,
    status: u16,
    body: &str,
) -> Result<TimeSeries, DataError> {
    let parsed = serde_json::from_str::<ChartResponse>(body);

    if let Ok(ChartResponse {
        chart: ChartBody {
            error: Some(error), ..
        },
    }) = &parsed
    {
        return Err(classify_provider_error(symbol, interval, error));
    }

    if !(200..300).contains(&status) {
        return Err(classify_status(symbol, interval, status));
    }

    let chart = parsed
        .map_err(|e| DataError::Network(format!("undecodable chart response: {}", e)))?
        .chart;

    let empty = || DataError::EmptyResult {
        symbol: symbol.to_string(),
        interval,
    };

    let result = chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(empty)?;
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().ok_or_else(empty)?;

    let mut rows = Vec::with_capacity(timestamps.len());
    let mut partial = 0usize;
    let mut bad_time = 0usize;
    for (i, &ts) in timestamps.iter().enumerate() {
        let field = |values: &[Option<f64>]| values.get(i).copied().flatten();

        let Some(millis) = ts.checked_mul(1000).filter(|ms| *ms >= 0) else {
            bad_time += 1;
            continue;
        };

        // Only keep rows where all OHLC values are present
        if let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) {
            let volume = field(&quote.volume).unwrap_or(0.0);
            rows.push(Bar::new(millis, open, high, low, close, volume));
        } else {
            partial += 1;
        }
    }
    if partial > 0 {
        debug!(symbol, %interval, partial, "skipped rows with missing prices");
    }
    if bad_time > 0 {
        warn!(symbol, %interval, bad_time, "skipped rows with out-of-range timestamps");
    }

    build_series(symbol, interval, rows)
}

fn classify_provider_error(symbol: &str, interval: Interval, error: &ChartError) -> DataError {
    match error.code.as_str() {
        "Not Found" => DataError::EmptyResult {
            symbol: symbol.to_string(),
            interval,
        },
        "Unprocessable Entity" | "Bad Request" => DataError::InvalidParameter(format!(
            "{} at {}: {}",
            symbol, interval, error.description
        )),
        _ => DataError::Network(format!("{}: {}", error.code, error.description)),
    }
}

fn classify_status(symbol: &str, interval: Interval, status: u16) -> DataError {
    match status {
        404 => DataError::InvalidParameter(format!("unknown symbol {}", symbol)),
        400 | 422 => {
            DataError::InvalidParameter(format!("provider rejected {} at {}", symbol, interval))
        }
        _ => DataError::Network(format!("provider returned status {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "BTC-USD"},
                "timestamp": [1700003600, 1700000000, 1700007200, 1700007200],
                "indicators": {"quote": [{
                    "open":   [101.0, 100.0, null, 102.0],
                    "high":   [103.0, 102.0, 104.0, 104.0],
                    "low":    [100.0,  99.0, 101.0, 101.0],
                    "close":  [102.0, 101.0, 103.0, 103.5],
                    "volume": [5000, 4000, 0, null]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_sorts_dedups_and_drops_partial_rows() {
        let series = parse_chart_response("BTC-USD", Interval::Hour1, 200, OK_BODY).unwrap();

        let stamps: Vec<i64> = series.iter().map(|b| b.timestamp).collect();
        assert_eq!(stamps, vec![1_700_000_000_000, 1_700_003_600_000, 1_700_007_200_000]);
        assert_eq!(series.last().unwrap().close, 103.5);
        assert_eq!(series.last().unwrap().volume, 0.0);
        assert_eq!(series.first().unwrap().volume, 4000.0);
    }

    #[test]
    fn test_out_of_range_timestamps_are_skipped() {
        let body = r#"{"chart":{"result":[{
            "timestamp": [92233720368547760, -60, 1700000000],
            "indicators": {"quote": [{
                "open": [1.0, 1.0, 2.0], "high": [1.0, 1.0, 2.0],
                "low": [1.0, 1.0, 2.0], "close": [1.0, 1.0, 2.0], "volume": [1, 1, 1]
            }]}
        }],"error":null}}"#;
        let series = parse_chart_response("BTC-USD", Interval::Daily, 200, body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.last().unwrap().timestamp, 1_700_000_000_000);

        let only_bad = body.replace(", 1700000000]", ", -1]");
        let err = parse_chart_response("BTC-USD", Interval::Daily, 200, &only_bad).unwrap_err();
        assert_eq!(err.kind(), "empty_result");
    }

    #[test]
    fn test_not_found_is_empty_result() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response("XXX-USD", Interval::Daily, 404, body).unwrap_err();
        assert_eq!(
            err,
            DataError::EmptyResult {
                symbol: "XXX-USD".into(),
                interval: Interval::Daily
            }
        );
    }

    #[test]
    fn test_unprocessable_is_invalid_parameter() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Unprocessable Entity","description":"Invalid input - interval=1m is not supported"}}}"#;
        let err = parse_chart_response("BTC-USD", Interval::Minute1, 422, body).unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");
    }

    #[test]
    fn test_status_classification_without_body() {
        let err = parse_chart_response("BTC-USD", Interval::Daily, 503, "<html>").unwrap_err();
        assert_eq!(err.kind(), "network");
        let err = parse_chart_response("BTC-USD", Interval::Daily, 429, "").unwrap_err();
        assert_eq!(err.kind(), "network");
        let err = parse_chart_response("BTC-USD", Interval::Daily, 404, "").unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");
    }

    #[test]
    fn test_garbage_success_body_is_network() {
        let err = parse_chart_response("BTC-USD", Interval::Daily, 200, "not json").unwrap_err();
        assert_eq!(err.kind(), "network");
    }

    #[test]
    fn test_no_rows_is_empty_result() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let err = parse_chart_response("BTC-USD", Interval::Daily, 200, body).unwrap_err();
        assert_eq!(err.kind(), "empty_result");
    }

    #[test]
    fn test_chart_url_trims_slash() {
        let source = YahooChartSource::new(YahooConfig {
            base_url: "http://localhost:9/".to_string(),
            ..YahooConfig::default()
        })
        .unwrap();
        assert_eq!(source.chart_url("ETH-USD"), "http://localhost:9/v8/finance/chart/ETH-USD");
    }

    #[tokio::test]
    async fn test_invalid_symbol_rejected_before_request() {
        let source = YahooChartSource::new(YahooConfig::default()).unwrap();
        let err = source.fetch("bad symbol", Interval::Daily).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_error() {
        let source = YahooChartSource::new(YahooConfig {
            // Port 9 (discard) on localhost is not expected to accept HTTP.
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_secs(2),
            ..YahooConfig::default()
        })
        .unwrap();
        let err = source.fetch("BTC-USD", Interval::Daily).await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
