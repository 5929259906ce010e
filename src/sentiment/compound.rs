//! Compound lexicon scorer backed by VADER.
//!
//! `vader_sentiment` does the rule work (boosters, caps emphasis, negation,
//! `but`, trailing `!`) and returns a normalized compound score plus the
//! positive/negative/neutral shares. This module only maps that output onto
//! [`CompoundScore`] and applies the ±0.05 label thresholds.

use super::Estimator;
use crate::models::{CompoundScore, SentimentLabel};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound at or above which text is labelled positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound at or below which text is labelled negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// VADER analyzer exposed as an [`Estimator`].
pub struct CompoundScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl std::fmt::Debug for CompoundScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompoundScorer").finish_non_exhaustive()
    }
}

impl Default for CompoundScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompoundScorer {
    /// Create a scorer over VADER's bundled lexicon.
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Estimator for CompoundScorer {
    type Output = CompoundScore;

    fn name(&self) -> &'static str {
        "compound"
    }

    fn estimate(&self, text: &str) -> CompoundScore {
        if text.trim().is_empty() {
            return CompoundScore::default();
        }

        let scores = self.analyzer.polarity_scores(text);
        let score = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        let compound = score("compound").clamp(-1.0, 1.0);

        CompoundScore {
            compound,
            positive: score("pos"),
            negative: score("neg"),
            neutral: score("neu"),
            label: label_for(compound),
        }
    }
}

/// Map a compound score onto a label with the ±0.05 thresholds.
pub fn label_for(compound: f64) -> SentimentLabel {
    if compound >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if compound <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}
