//! Aggregate headline polarity into a score and label.

use pulse_core::error::SentimentError;
use pulse_core::traits::PolarityAnalyzer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::headlines::HeadlineSource;
use crate::lexicon::LexiconAnalyzer;

/// Scores at or above this are bullish.
pub const BULLISH_THRESHOLD: u8 = 60;
/// Scores at or below this are bearish.
pub const BEARISH_THRESHOLD: u8 = 40;

/// Discrete market mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    /// Classify a 0-100 score. Both thresholds are inclusive.
    pub fn from_score(score: u8) -> Self {
        if score >= BULLISH_THRESHOLD {
            SentimentLabel::Bullish
        } else if score <= BEARISH_THRESHOLD {
            SentimentLabel::Bearish
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::Neutral => "Neutral",
        };
        write!(f, "{}", s)
    }
}

/// One scored headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub text: String,
    /// Polarity in [-1, 1]
    pub polarity: f64,
}

/// Result of scoring a batch of headlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Aggregate score in [0, 100]
    pub score: u8,
    pub label: SentimentLabel,
    /// Mean polarity in [-1, 1]
    pub mean_polarity: f64,
    /// Per-headline polarities, in input order
    pub samples: Vec<SentimentSample>,
}

/// Map a mean polarity in [-1, 1] onto a rounded 0-100 score.
pub fn score_from_mean(mean: f64) -> u8 {
    ((mean + 1.0) / 2.0 * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Scores headlines with a pluggable polarity analyzer.
#[derive(Clone)]
pub struct SentimentEngine {
    analyzer: Arc<dyn PolarityAnalyzer>,
}

impl Default for SentimentEngine {
    fn default() -> Self {
        Self::new(Arc::new(LexiconAnalyzer::default()))
    }
}

impl SentimentEngine {
    /// Create an engine around any analyzer.
    pub fn new(analyzer: Arc<dyn PolarityAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    /// Score a batch of headlines.
    ///
    /// Polarities outside [-1, 1] are clamped. A NaN polarity is reported as
    /// an error rather than guessed.
    pub fn score<S: AsRef<str>>(
        &self,
        headlines: &[S],
    ) -> Result<SentimentSummary, SentimentError> {
        if headlines.is_empty() {
            return Err(SentimentError::EmptyInput);
        }

        let mut samples = Vec::with_capacity(headlines.len());
        for (index, headline) in headlines.iter().enumerate() {
            let text = headline.as_ref();
            let value = self.analyzer.polarity(text);
            if value.is_nan() {
                return Err(SentimentError::InvalidPolarity { index, value });
            }
            samples.push(SentimentSample {
                text: text.to_string(),
                polarity: value.clamp(-1.0, 1.0),
            });
        }

        let mean_polarity = samples.iter().map(|s| s.polarity).sum::<f64>() / samples.len() as f64;
        let score = score_from_mean(mean_polarity);
        let label = SentimentLabel::from_score(score);

        debug!(
            analyzer = self.analyzer.name(),
            headlines = samples.len(),
            mean_polarity,
            score,
            %label,
            "scored headlines"
        );

        Ok(SentimentSummary {
            score,
            label,
            mean_polarity,
            samples,
        })
    }

    /// Pull headlines from a source and score them.
    pub fn score_source(
        &self,
        source: &dyn HeadlineSource,
    ) -> Result<SentimentSummary, SentimentError> {
        self.score(&source.headlines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headlines::StaticHeadlines;

    /// Headlines carry their polarity as text, e.g. "0.25".
    fn numeric_engine() -> SentimentEngine {
        SentimentEngine::new(Arc::new(|text: &str| text.parse::<f64>().unwrap_or(0.0)))
    }

    #[test]
    fn test_empty_input_fails() {
        let empty: [&str; 0] = [];
        assert_eq!(numeric_engine().score(&empty), Err(SentimentError::EmptyInput));
    }

    #[test]
    fn test_all_positive_is_bullish_100() {
        let summary = numeric_engine().score(&["1.0", "1.0", "1.0"]).unwrap();
        assert_eq!(summary.score, 100);
        assert_eq!(summary.label, SentimentLabel::Bullish);
    }

    #[test]
    fn test_threshold_boundaries() {
        let engine = numeric_engine();

        let at_60 = engine.score(&["0.2"]).unwrap();
        assert_eq!(at_60.score, 60);
        assert_eq!(at_60.label, SentimentLabel::Bullish);

        let at_40 = engine.score(&["-0.2"]).unwrap();
        assert_eq!(at_40.score, 40);
        assert_eq!(at_40.label, SentimentLabel::Bearish);

        let at_50 = engine.score(&["0.5", "-0.5"]).unwrap();
        assert_eq!(at_50.score, 50);
        assert_eq!(at_50.label, SentimentLabel::Neutral);

        assert_eq!(SentimentLabel::from_score(59), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(41), SentimentLabel::Neutral);
    }

    #[test]
    fn test_samples_keep_input_order() {
        let summary = numeric_engine().score(&["0.1", "-0.3", "0.7"]).unwrap();
        let polarities: Vec<f64> = summary.samples.iter().map(|s| s.polarity).collect();
        assert_eq!(polarities, vec![0.1, -0.3, 0.7]);
        assert_eq!(summary.samples[1].text, "-0.3");
    }

    #[test]
    fn test_score_monotonic_in_mean_polarity() {
        let engine = numeric_engine();
        let sets: Vec<Vec<String>> = (-10..=10)
            .map(|i| {
                let p = i as f64 / 10.0;
                vec![format!("{}", p), format!("{}", p / 2.0)]
            })
            .collect();

        let scores: Vec<(f64, u8)> = sets
            .iter()
            .map(|set| {
                let s = engine.score(set).unwrap();
                (s.mean_polarity, s.score)
            })
            .collect();

        for pair in scores.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
            assert!(pair[0].1 <= pair[1].1, "{:?} then {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_out_of_range_polarity_is_clamped() {
        let summary = numeric_engine().score(&["3.0"]).unwrap();
        assert_eq!(summary.samples[0].polarity, 1.0);
        assert_eq!(summary.score, 100);
    }

    #[test]
    fn test_nan_polarity_is_error() {
        let engine = SentimentEngine::new(Arc::new(|_: &str| f64::NAN));
        let err = engine.score(&["anything"]).unwrap_err();
        assert!(matches!(err, SentimentError::InvalidPolarity { index: 0, .. }));
    }

    #[test]
    fn test_default_engine_scores_source() {
        let source = StaticHeadlines::new(vec![
            "Bitcoin rallies on strong demand".to_string(),
            "Traders optimistic after successful upgrade".to_string(),
        ]);
        let summary = SentimentEngine::default().score_source(&source).unwrap();
        assert_eq!(summary.label, SentimentLabel::Bullish);
        assert_eq!(summary.samples.len(), 2);
    }

    #[test]
    fn test_score_from_mean_clamps() {
        assert_eq!(score_from_mean(-1.0), 0);
        assert_eq!(score_from_mean(0.0), 50);
        assert_eq!(score_from_mean(1.0), 100);
        assert_eq!(score_from_mean(2.0), 100);
    }
}
