//! Headline sources for sentiment scoring.

use std::sync::{Mutex, PoisonError};

/// Built-in market headlines used when nothing else is configured.
pub const DEFAULT_HEADLINES: &[&str] = &[
    "Bitcoin rallies as institutional investors show strong interest",
    "Ethereum network upgrade improves transaction efficiency significantly",
    "Solana addresses scalability concerns with latest protocol update",
    "Cryptocurrency market shows signs of recovery and stability",
    "New regulatory framework could boost crypto adoption",
    "Market volatility raises concerns among traders",
    "Technical analysis indicates potential breakout patterns",
    "Experts remain optimistic about long-term crypto potential",
];

/// Supplies the ordered text snippets to score.
pub trait HeadlineSource: Send + Sync {
    /// Current headlines, in display order.
    fn headlines(&self) -> Vec<String>;

    /// Get the source name.
    fn name(&self) -> &str;
}

/// A fixed list of headlines.
#[derive(Debug, Clone)]
pub struct StaticHeadlines {
    headlines: Vec<String>,
}

impl Default for StaticHeadlines {
    fn default() -> Self {
        Self::new(DEFAULT_HEADLINES.iter().map(|h| h.to_string()).collect())
    }
}

impl StaticHeadlines {
    pub fn new(headlines: Vec<String>) -> Self {
        Self { headlines }
    }
}

impl HeadlineSource for StaticHeadlines {
    fn headlines(&self) -> Vec<String> {
        self.headlines.clone()
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Random subset of a headline pool, between `min` and `max` items.
///
/// Picked headlines keep their pool order.
#[derive(Debug)]
pub struct SampledHeadlines {
    pool: Vec<String>,
    min: usize,
    max: usize,
    rng: Mutex<fastrand::Rng>,
}

impl SampledHeadlines {
    /// Sample from `pool`. Bounds are clamped to the pool size and `min`
    /// never exceeds `max`.
    pub fn new(pool: Vec<String>, min: usize, max: usize) -> Self {
        Self::with_rng(pool, min, max, fastrand::Rng::new())
    }

    /// Deterministic sampling for reproducible output.
    pub fn with_seed(pool: Vec<String>, min: usize, max: usize, seed: u64) -> Self {
        Self::with_rng(pool, min, max, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(pool: Vec<String>, min: usize, max: usize, rng: fastrand::Rng) -> Self {
        let max = max.min(pool.len());
        let min = min.min(max);
        Self {
            pool,
            min,
            max,
            rng: Mutex::new(rng),
        }
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.min, self.max)
    }
}

impl HeadlineSource for SampledHeadlines {
    fn headlines(&self) -> Vec<String> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let count = rng.usize(self.min..=self.max);

        let mut picks: Vec<usize> = (0..self.pool.len()).collect();
        rng.shuffle(&mut picks);
        picks.truncate(count);
        picks.sort_unstable();

        picks.into_iter().map(|i| self.pool[i].clone()).collect()
    }

    fn name(&self) -> &str {
        "sampled"
    }
}
