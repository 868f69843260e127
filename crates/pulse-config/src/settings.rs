//! Configuration structures.

use config::ConfigError;
use pulse_core::types::{Asset, AssetUniverse, Interval};
use pulse_data::{COINGECKO_BASE_URL, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use pulse_sentiment::DEFAULT_HEADLINES;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub provider: ProviderSettings,
    pub intervals: IntervalSettings,
    pub sentiment: SentimentSettings,
    pub assets: Vec<AssetSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            logging: LoggingConfig::default(),
            cache: CacheSettings::default(),
            provider: ProviderSettings::default(),
            intervals: IntervalSettings::default(),
            sentiment: SentimentSettings::default(),
            assets: vec![
                AssetSettings::new("Bitcoin", "BTC-USD").with_coin_id("bitcoin"),
                AssetSettings::new("Ethereum", "ETH-USD").with_coin_id("ethereum"),
                AssetSettings::new("Solana", "SOL-USD").with_coin_id("solana"),
            ],
        }
    }
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "market-pulse".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Series cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_seconds: u64,
    /// 0 disables the caller-side fetch timeout
    pub fetch_timeout_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            fetch_timeout_secs: 15,
        }
    }
}

/// Which market data provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    CoinGecko,
    Csv,
}

/// Market data provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Yahoo chart API root
    pub base_url: String,
    /// CoinGecko API root
    pub coingecko_url: String,
    /// CoinGecko quote currency
    pub vs_currency: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Directory of `{SYMBOL}_{interval}.csv` files for the csv provider
    pub csv_dir: PathBuf,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: DEFAULT_BASE_URL.to_string(),
            coingecko_url: COINGECKO_BASE_URL.to_string(),
            vs_currency: "usd".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            csv_dir: PathBuf::from("data"),
        }
    }
}

/// Offered intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalSettings {
    pub available: Vec<Interval>,
    pub default: Interval,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            available: Interval::all().to_vec(),
            default: Interval::Daily,
        }
    }
}

/// Headline sentiment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentSettings {
    pub headlines: Vec<String>,
    /// Score a random subset of at least this many headlines
    pub sample_min: Option<usize>,
    /// Score a random subset of at most this many headlines
    pub sample_max: Option<usize>,
    /// Seed for reproducible sampling
    pub seed: Option<u64>,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            headlines: DEFAULT_HEADLINES.iter().map(|h| h.to_string()).collect(),
            sample_min: None,
            sample_max: None,
            seed: None,
        }
    }
}

/// One configured asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSettings {
    pub name: String,
    pub symbol: String,
    /// CoinGecko coin id, required by the coingecko provider
    #[serde(default)]
    pub coin_id: Option<String>,
}

impl AssetSettings {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            coin_id: None,
        }
    }

    pub fn with_coin_id(mut self, coin_id: &str) -> Self {
        self.coin_id = Some(coin_id.to_string());
        self
    }
}

impl AppConfig {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Message(msg));

        if self.cache.ttl_seconds == 0 {
            return fail("cache.ttl_seconds must be greater than 0".into());
        }
        if self.assets.is_empty() {
            return fail("at least one asset must be configured".into());
        }

        let mut names = HashSet::new();
        let mut symbols = HashSet::new();
        for asset in &self.assets {
            if asset.name.trim().is_empty() || asset.symbol.trim().is_empty() {
                return fail(format!("asset '{}' needs a name and a symbol", asset.name));
            }
            if !names.insert(asset.name.to_lowercase()) {
                return fail(format!("duplicate asset name '{}'", asset.name));
            }
            if !symbols.insert(asset.symbol.to_uppercase()) {
                return fail(format!("duplicate asset symbol '{}'", asset.symbol));
            }
            let has_coin_id = asset.coin_id.as_deref().is_some_and(|id| !id.trim().is_empty());
            if self.provider.kind == ProviderKind::CoinGecko && !has_coin_id {
                return fail(format!(
                    "asset '{}' needs a coin_id for the coingecko provider",
                    asset.name
                ));
            }
        }

        if self.intervals.available.is_empty() {
            return fail("intervals.available must not be empty".into());
        }
        if !self.intervals.available.contains(&self.intervals.default) {
            return fail(format!(
                "default interval {} is not in intervals.available",
                self.intervals.default
            ));
        }

        if let (Some(min), Some(max)) = (self.sentiment.sample_min, self.sentiment.sample_max) {
            if min > max {
                return fail(format!(
                    "sentiment.sample_min ({}) exceeds sentiment.sample_max ({})",
                    min, max
                ));
            }
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return fail(format!("unknown logging.format '{}'", self.logging.format));
        }

        Ok(())
    }

    /// Display-name to provider-symbol mapping.
    pub fn asset_universe(&self) -> AssetUniverse {
        AssetUniverse::new(
            self.assets
                .iter()
                .map(|a| Asset::new(a.name.clone(), a.symbol.clone()))
                .collect(),
        )
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        match self.cache.fetch_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Provider symbol to CoinGecko coin id, for assets that have one.
    pub fn coin_ids(&self) -> HashMap<String, String> {
        self.assets
            .iter()
            .filter_map(|a| a.coin_id.clone().map(|id| (a.symbol.clone(), id)))
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.request_timeout_secs)
    }

    /// Render as TOML, e.g. to bootstrap a config file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
