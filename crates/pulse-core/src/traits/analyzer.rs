//! Text polarity capability.

/// Anything that can score a snippet of text from -1 (negative) to 1 (positive).
pub trait PolarityAnalyzer: Send + Sync {
    /// Polarity of `text` in [-1, 1].
    fn polarity(&self, text: &str) -> f64;

    /// Get the analyzer name.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> PolarityAnalyzer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}
