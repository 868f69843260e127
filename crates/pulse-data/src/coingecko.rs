//! CoinGecko OHLC adapter.

use async_trait::async_trait;
use pulse_core::error::DataError;
use pulse_core::traits::MarketDataSource;
use pulse_core::types::{Bar, Interval, TimeSeries};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::normalize::{build_series, validate_symbol};
use crate::yahoo::DEFAULT_USER_AGENT;

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";

/// Day ranges the public OHLC endpoint accepts.
const OHLC_DAYS: [i64; 7] = [1, 7, 14, 30, 90, 180, 365];

/// CoinGecko API configuration.
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Quote currency, e.g. `usd`
    pub vs_currency: String,
    pub request_timeout: Duration,
    /// Provider symbol to CoinGecko coin id, e.g. `BTC-USD` to `bitcoin`
    pub coin_ids: HashMap<String, String>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            vs_currency: "usd".to_string(),
            request_timeout: Duration::from_secs(10),
            coin_ids: HashMap::new(),
        }
    }
}

/// `[timestamp_ms, open, high, low, close]`
type OhlcRow = (i64, Option<f64>, Option<f64>, Option<f64>, Option<f64>);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OhlcResponse {
    Rows(Vec<OhlcRow>),
    Failure(FailureBody),
}

#[derive(Debug, Deserialize)]
struct FailureBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    status: Option<FailureStatus>,
}

#[derive(Debug, Deserialize)]
struct FailureStatus {
    #[serde(default)]
    error_message: String,
}

impl FailureBody {
    fn message(&self) -> String {
        match (&self.error, &self.status) {
            (Some(error), _) => error.clone(),
            (None, Some(status)) => status.error_message.clone(),
            (None, None) => "unknown provider error".to_string(),
        }
    }

    fn is_unknown_coin(&self) -> bool {
        self.message().to_lowercase().contains("not found")
    }
}

/// Market data from the CoinGecko OHLC endpoint.
///
/// CoinGecko picks the candle width from the requested day range, so rows
/// may be coarser than the requested interval. The endpoint reports no
/// volume; it is recorded as 0.
pub struct CoinGeckoSource {
    config: CoinGeckoConfig,
    coin_ids: HashMap<String, String>,
    client: Client,
}

impl CoinGeckoSource {
    /// Create a new client.
    pub fn new(config: CoinGeckoConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DataError::Network(e.to_string()))?;

        let coin_ids = config
            .coin_ids
            .iter()
            .map(|(symbol, id)| (symbol.to_uppercase(), id.clone()))
            .collect();

        Ok(Self {
            config,
            coin_ids,
            client,
        })
    }

    fn coin_id(&self, symbol: &str) -> Result<&str, DataError> {
        self.coin_ids
            .get(&symbol.to_uppercase())
            .map(String::as_str)
            .ok_or_else(|| {
                DataError::InvalidParameter(format!("no CoinGecko coin id for {}", symbol))
            })
    }

    fn ohlc_url(&self, coin_id: &str) -> String {
        format!(
            "{}/api/v3/coins/{}/ohlc",
            self.config.base_url.trim_end_matches('/'),
            coin_id
        )
    }
}

/// Smallest accepted day range covering the interval's lookback.
pub fn ohlc_days(interval: Interval) -> i64 {
    let wanted = interval.lookback().num_days();
    OHLC_DAYS
        .iter()
        .copied()
        .find(|&days| days >= wanted)
        .unwrap_or(OHLC_DAYS[OHLC_DAYS.len() - 1])
}

#[async_trait]
impl MarketDataSource for CoinGeckoSource {
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<TimeSeries, DataError> {
        validate_symbol(symbol)?;
        let coin_id = self.coin_id(symbol)?;

        let url = self.ohlc_url(coin_id);
        let params = [
            ("vs_currency", self.config.vs_currency.clone()),
            ("days", ohlc_days(interval).to_string()),
        ];
        debug!(symbol, coin_id, %interval, url = %url, "requesting ohlc");

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

        parse_ohlc_response(symbol, interval, status, &body)
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}

/// Translate an OHLC response into a series or a classified error.
fn parse_ohlc_response(
    symbol: &str,
    interval: Interval,
    status: u16,
    body: &str,
) -> Result<TimeSeries, DataError> {
    let parsed = serde_json::from_str::<OhlcResponse>(body);

    if let Ok(OhlcResponse::Failure(failure)) = &parsed {
        if failure.is_unknown_coin() {
            return Err(DataError::InvalidParameter(format!(
                "{}: {}",
                symbol,
                failure.message()
            )));
        }
        if (200..300).contains(&status) {
            return Err(DataError::Network(failure.message()));
        }
    }

    if !(200..300).contains(&status) {
        return Err(classify_status(symbol, status));
    }

    let rows = match parsed {
        Ok(OhlcResponse::Rows(rows)) => rows,
        Ok(OhlcResponse::Failure(failure)) => return Err(DataError::Network(failure.message())),
        Err(e) => {
            return Err(DataError::Network(format!("undecodable ohlc response: {}", e)));
        }
    };

    let mut bars = Vec::with_capacity(rows.len());
    let mut partial = 0usize;
    for (timestamp, open, high, low, close) in rows {
        match (open, high, low, close) {
            (Some(open), Some(high), Some(low), Some(close)) => {
                bars.push(Bar::new(timestamp, open, high, low, close, 0.0));
            }
            _ => partial += 1,
        }
    }
    if partial > 0 {
        debug!(symbol, %interval, partial, "skipped rows with missing prices");
    }

    build_series(symbol, interval, bars)
}

fn classify_status(symbol: &str, status: u16) -> DataError {
    match status {
        404 => DataError::InvalidParameter(format!("unknown coin for {}", symbol)),
        400 | 422 => {
            DataError::InvalidParameter(format!("provider rejected request for {}", symbol))
        }
        _ => DataError::Network(format!("provider returned status {}", status)),
    }
}
