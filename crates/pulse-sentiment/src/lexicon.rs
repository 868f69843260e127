//! Word-level lexicon polarity analyzer.

use pulse_core::traits::PolarityAnalyzer;
use std::collections::HashMap;

/// Built-in word polarities, tuned for market headlines.
const MARKET_LEXICON: &[(&str, f64)] = &[
    // Positive
    ("adoption", 0.2),
    ("approval", 0.4),
    ("approved", 0.4),
    ("beat", 0.3),
    ("best", 1.0),
    ("boost", 0.4),
    ("boosts", 0.4),
    ("breakout", 0.3),
    ("bullish", 0.7),
    ("efficiency", 0.2),
    ("efficient", 0.3),
    ("excellent", 1.0),
    ("gain", 0.4),
    ("gains", 0.4),
    ("good", 0.7),
    ("great", 0.8),
    ("growth", 0.4),
    ("improve", 0.4),
    ("improved", 0.4),
    ("improves", 0.4),
    ("optimistic", 0.5),
    ("positive", 0.23),
    ("profit", 0.4),
    ("profits", 0.4),
    ("rallied", 0.5),
    ("rallies", 0.5),
    ("rally", 0.5),
    ("recovery", 0.4),
    ("rise", 0.3),
    ("rises", 0.3),
    ("soar", 0.6),
    ("soars", 0.6),
    ("stability", 0.3),
    ("stable", 0.3),
    ("strong", 0.43),
    ("success", 0.5),
    ("successful", 0.75),
    ("surge", 0.6),
    ("surges", 0.6),
    ("upgrade", 0.3),
    // Negative
    ("bad", -0.7),
    ("ban", -0.6),
    ("bearish", -0.7),
    ("collapse", -0.8),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("crash", -0.8),
    ("crashes", -0.8),
    ("decline", -0.4),
    ("declines", -0.4),
    ("drop", -0.3),
    ("drops", -0.3),
    ("fall", -0.3),
    ("falls", -0.3),
    ("fear", -0.5),
    ("fears", -0.5),
    ("fraud", -0.8),
    ("hack", -0.7),
    ("hacked", -0.7),
    ("lawsuit", -0.5),
    ("loss", -0.5),
    ("losses", -0.5),
    ("negative", -0.3),
    ("panic", -0.6),
    ("plunge", -0.7),
    ("plunges", -0.7),
    ("poor", -0.4),
    ("risk", -0.2),
    ("risks", -0.2),
    ("scam", -0.9),
    ("selloff", -0.5),
    ("slump", -0.6),
    ("uncertain", -0.3),
    ("uncertainty", -0.3),
    ("volatile", -0.4),
    ("volatility", -0.3),
    ("warning", -0.4),
    ("weak", -0.4),
    ("worst", -1.0),
];

const NEGATORS: &[&str] = &["not", "no", "never", "nor", "none", "cannot", "without"];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("highly", 1.3),
    ("really", 1.3),
    ("significantly", 1.3),
    ("strongly", 1.3),
    ("very", 1.3),
    ("somewhat", 0.7),
    ("slightly", 0.5),
];

/// Negation flips and halves the next scored word.
const NEGATION_FACTOR: f64 = -0.5;
/// Modifiers lapse after this many unscored words.
const MODIFIER_REACH: usize = 2;

/// Rule-based analyzer: mean polarity of lexicon words, with negation and
/// intensifiers applied to the following scored word.
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    words: HashMap<String, f64>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new(MARKET_LEXICON.iter().map(|(w, p)| (w.to_string(), *p)))
    }
}

impl LexiconAnalyzer {
    /// Create an analyzer from (word, polarity) pairs.
    pub fn new(entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut analyzer = Self {
            words: HashMap::new(),
        };
        analyzer.extend(entries);
        analyzer
    }

    /// Add or override entries. Polarities are clamped to [-1, 1].
    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, f64)>) {
        for (word, polarity) in entries {
            self.words
                .insert(word.to_lowercase(), polarity.clamp(-1.0, 1.0));
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn is_negator(token: &str) -> bool {
        NEGATORS.contains(&token) || token.ends_with("n't")
    }

    fn intensity(token: &str) -> Option<f64> {
        INTENSIFIERS
            .iter()
            .find(|(w, _)| *w == token)
            .map(|(_, factor)| *factor)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase().replace('\u{2019}', "'"))
}

impl PolarityAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut negated = false;
        let mut multiplier = 1.0;
        let mut since_modifier = 0;

        for token in tokenize(text) {
            if Self::is_negator(&token) {
                negated = true;
                since_modifier = 0;
            } else if let Some(factor) = Self::intensity(&token) {
                multiplier *= factor;
                since_modifier = 0;
            } else if let Some(&base) = self.words.get(&token) {
                let mut score = base * multiplier;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
                negated = false;
                multiplier = 1.0;
            } else {
                since_modifier += 1;
                if since_modifier > MODIFIER_REACH {
                    negated = false;
                    multiplier = 1.0;
                }
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
