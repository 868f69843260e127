//! Wiring from configuration to running services.

use anyhow::{bail, Context, Result};
use pulse_config::{AppConfig, ProviderKind};
use pulse_core::traits::MarketDataSource;
use pulse_core::types::{Asset, AssetUniverse, Interval};
use pulse_data::{
    CoinGeckoConfig, CoinGeckoSource, CsvSource, SeriesCache, SeriesService, YahooChartSource,
    YahooConfig,
};
use pulse_sentiment::{HeadlineSource, SampledHeadlines, StaticHeadlines};
use std::sync::Arc;
use tracing::debug;

/// Services built from one loaded configuration.
pub struct App {
    pub config: AppConfig,
    pub universe: AssetUniverse,
    pub series: SeriesService,
}

impl App {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let source = build_source(&config)?;

        let mut cache = SeriesCache::new(config.cache_ttl());
        if let Some(timeout) = config.fetch_timeout() {
            cache = cache.with_fetch_timeout(timeout);
        }

        debug!(
            provider = source.name(),
            ttl_secs = config.cache.ttl_seconds,
            "services ready"
        );

        Ok(Self {
            universe: config.asset_universe(),
            series: SeriesService::new(Arc::new(cache), source),
            config,
        })
    }

    /// Resolve optional asset and interval arguments against the configuration.
    pub fn select(&self, asset: Option<&str>, interval: Option<&str>) -> Result<(Asset, Interval)> {
        let asset = match asset {
            Some(query) => self.universe.resolve(query).cloned().with_context(|| {
                let known: Vec<&str> =
                    self.universe.assets().iter().map(|a| a.name.as_str()).collect();
                format!("Unknown asset '{}'. Configured: {}", query, known.join(", "))
            })?,
            None => self
                .universe
                .assets()
                .first()
                .cloned()
                .context("No assets configured")?,
        };

        let interval = match interval {
            Some(s) => s.parse::<Interval>().map_err(anyhow::Error::msg)?,
            None => self.config.intervals.default,
        };
        if !self.config.intervals.available.contains(&interval) {
            bail!("Interval {} is not enabled in intervals.available", interval);
        }

        Ok((asset, interval))
    }
}

fn build_source(config: &AppConfig) -> Result<Arc<dyn MarketDataSource>> {
    let provider = &config.provider;
    Ok(match provider.kind {
        ProviderKind::Yahoo => {
            let source = YahooChartSource::new(YahooConfig {
                base_url: provider.base_url.clone(),
                user_agent: provider.user_agent.clone(),
                request_timeout: config.request_timeout(),
            })
            .context("Failed to create Yahoo client")?;
            Arc::new(source)
        }
        ProviderKind::CoinGecko => {
            let source = CoinGeckoSource::new(CoinGeckoConfig {
                base_url: provider.coingecko_url.clone(),
                user_agent: provider.user_agent.clone(),
                vs_currency: provider.vs_currency.clone(),
                request_timeout: config.request_timeout(),
                coin_ids: config.coin_ids(),
            })
            .context("Failed to create CoinGecko client")?;
            Arc::new(source)
        }
        ProviderKind::Csv => Arc::new(CsvSource::new(provider.csv_dir.clone())),
    })
}

/// Headline source described by the sentiment settings.
pub fn headline_source(config: &AppConfig) -> Box<dyn HeadlineSource> {
    let settings = &config.sentiment;
    let pool = settings.headlines.clone();

    match (settings.sample_min, settings.sample_max) {
        (None, None) => Box::new(StaticHeadlines::new(pool)),
        (min, max) => {
            let min = min.unwrap_or(1);
            let max = max.unwrap_or(pool.len());
            match settings.seed {
                Some(seed) => Box::new(SampledHeadlines::with_seed(pool, min, max, seed)),
                None => Box::new(SampledHeadlines::new(pool, min, max)),
            }
        }
    }
}
