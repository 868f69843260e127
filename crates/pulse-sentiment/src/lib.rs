//! Headline sentiment scoring.
//!
//! A [`SentimentEngine`] turns an ordered list of headlines into a 0-100
//! score and a Bullish/Bearish/Neutral label. Polarity comes from any
//! [`PolarityAnalyzer`](pulse_core::traits::PolarityAnalyzer); the built-in
//! [`LexiconAnalyzer`] is used by default.

mod engine;
mod headlines;
mod lexicon;

pub use engine::{
    score_from_mean, SentimentEngine, SentimentLabel, SentimentSample, SentimentSummary,
    BEARISH_THRESHOLD, BULLISH_THRESHOLD,
};
pub use headlines::{HeadlineSource, SampledHeadlines, StaticHeadlines, DEFAULT_HEADLINES};
pub use lexicon::LexiconAnalyzer;
