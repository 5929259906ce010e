//! Lexicon-driven polarity and subjectivity.
//!
//! Each known word carries a `(polarity, subjectivity)` pair. A directly
//! preceding intensifier scales both, a negation up to three words back
//! flips and halves the polarity, and the text's scores are the means over
//! the matched words.

use super::Estimator;
use crate::models::{LexicalScore, SentimentLabel};
use std::collections::HashMap;

/// Polarity above which text is labelled positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Polarity below which text is labelled negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

const NEGATION_SCALE: f64 = -0.5;
const NEGATION_REACH: usize = 3;

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nor", "neither", "without", "cannot", "cant", "dont", "doesnt", "didnt",
    "isnt", "wasnt", "arent", "werent", "wont", "hardly",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.2),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("hugely", 1.4),
    ("incredibly", 1.5),
    ("most", 1.2),
    ("so", 1.2),
    ("too", 1.1),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("fairly", 0.8),
    ("marginally", 0.5),
];

#[rustfmt::skip]
const LEXICON: &[(&str, f64, f64)] = &[
    // general
    ("good", 0.7, 0.6), ("great", 0.8, 0.75), ("excellent", 1.0, 1.0), ("best", 1.0, 0.3),
    ("better", 0.5, 0.5), ("positive", 0.23, 0.55), ("happy", 0.8, 1.0), ("optimistic", 0.5, 0.6),
    ("impressive", 1.0, 1.0), ("solid", 0.4, 0.5), ("strong", 0.43, 0.73), ("stronger", 0.45, 0.7),
    ("strongest", 0.6, 0.8), ("success", 0.6, 0.6), ("successful", 0.75, 0.95), ("win", 0.6, 0.6),
    ("wins", 0.6, 0.6), ("love", 0.5, 0.6), ("amazing", 0.6, 0.9), ("robust", 0.4, 0.5),
    ("healthy", 0.5, 0.5), ("confident", 0.5, 0.6), ("confidence", 0.3, 0.5), ("promising", 0.5, 0.7),
    ("bad", -0.7, 0.67), ("worse", -0.4, 0.6), ("worst", -1.0, 1.0), ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0), ("poor", -0.4, 0.6), ("weak", -0.38, 0.63), ("weaker", -0.4, 0.6),
    ("weakest", -0.6, 0.8), ("negative", -0.3, 0.4), ("sad", -0.5, 1.0), ("fail", -0.5, 0.3),
    ("fails", -0.5, 0.3), ("failed", -0.5, 0.3), ("failure", -0.3, 0.3), ("disappointing", -0.6, 0.7),
    ("disappoints", -0.6, 0.7), ("pessimistic", -0.5, 0.6), ("fear", -0.4, 0.6), ("fears", -0.4, 0.6),
    ("panic", -0.6, 0.8), ("worry", -0.5, 0.6), ("worries", -0.5, 0.6), ("worried", -0.5, 0.6),
    ("concern", -0.2, 0.4), ("concerns", -0.2, 0.4), ("uncertainty", -0.3, 0.5), ("uncertain", -0.3, 0.5),
    ("risk", -0.2, 0.4), ("risky", -0.4, 0.6), ("trouble", -0.4, 0.5), ("troubled", -0.5, 0.6),
    ("crisis", -0.6, 0.6), ("dangerous", -0.6, 0.9), ("scandal", -0.6, 0.7), ("lawsuit", -0.3, 0.3),
    ("fraud", -0.7, 0.7), ("angry", -0.5, 1.0),
    // markets
    ("surge", 0.6, 0.6), ("surges", 0.6, 0.6), ("surged", 0.6, 0.6), ("surging", 0.6, 0.6),
    ("soar", 0.7, 0.7), ("soars", 0.7, 0.7), ("soared", 0.7, 0.7), ("soaring", 0.7, 0.7),
    ("jump", 0.4, 0.4), ("jumps", 0.4, 0.4), ("jumped", 0.4, 0.4), ("rally", 0.5, 0.5),
    ("rallies", 0.5, 0.5), ("rallied", 0.5, 0.5), ("gain", 0.4, 0.4), ("gains", 0.4, 0.4),
    ("gained", 0.4, 0.4), ("rise", 0.3, 0.3), ("rises", 0.3, 0.3), ("rising", 0.3, 0.3),
    ("climb", 0.3, 0.3), ("climbs", 0.3, 0.3), ("boost", 0.4, 0.4), ("boosts", 0.4, 0.4),
    ("beat", 0.4, 0.4), ("beats", 0.4, 0.4), ("upgrade", 0.5, 0.4), ("upgrades", 0.5, 0.4),
    ("upgraded", 0.5, 0.4), ("outperform", 0.5, 0.5), ("outperforms", 0.5, 0.5), ("bullish", 0.6, 0.6),
    ("profit", 0.4, 0.3), ("profits", 0.4, 0.3), ("profitable", 0.5, 0.4), ("growth", 0.3, 0.3),
    ("record", 0.2, 0.2), ("breakthrough", 0.6, 0.6), ("recovery", 0.3, 0.4), ("rebound", 0.4, 0.4),
    ("rebounds", 0.4, 0.4),
    ("plunge", -0.6, 0.6), ("plunges", -0.6, 0.6), ("plunged", -0.6, 0.6), ("plummet", -0.7, 0.7),
    ("plummets", -0.7, 0.7), ("plummeted", -0.7, 0.7), ("crash", -0.6, 0.6), ("crashes", -0.6, 0.6),
    ("crashed", -0.6, 0.6), ("tumble", -0.5, 0.5), ("tumbles", -0.5, 0.5), ("slump", -0.5, 0.5),
    ("slumps", -0.5, 0.5), ("sink", -0.4, 0.4), ("sinks", -0.4, 0.4), ("fall", -0.3, 0.3),
    ("falls", -0.3, 0.3), ("fell", -0.3, 0.3), ("drop", -0.3, 0.3), ("drops", -0.3, 0.3),
    ("decline", -0.3, 0.3), ("declines", -0.3, 0.3), ("loss", -0.4, 0.3), ("losses", -0.4, 0.3),
    ("miss", -0.4, 0.4), ("misses", -0.4, 0.4), ("downgrade", -0.5, 0.4), ("downgrades", -0.5, 0.4),
    ("downgraded", -0.5, 0.4), ("underperform", -0.5, 0.5), ("bearish", -0.6, 0.6), ("recall", -0.3, 0.3),
    ("recalls", -0.3, 0.3), ("layoffs", -0.5, 0.4), ("bankruptcy", -0.8, 0.6), ("selloff", -0.5, 0.5),
    ("recession", -0.6, 0.5), ("volatile", -0.2, 0.5), ("volatility", -0.2, 0.5), ("cut", -0.2, 0.3),
    ("cuts", -0.2, 0.3), ("probe", -0.3, 0.3), ("investigation", -0.3, 0.3),
];

/// Lexicon polarity/subjectivity scorer.
#[derive(Debug, Clone)]
pub struct LexicalScorer {
    lexicon: HashMap<&'static str, (f64, f64)>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalScorer {
    /// Scorer over the built-in lexicon and intensifier list.
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON
                .iter()
                .map(|&(word, polarity, subjectivity)| (word, (polarity, subjectivity)))
                .collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

impl Estimator for LexicalScorer {
    type Output = LexicalScore;

    fn name(&self) -> &'static str {
        "lexical"
    }

    fn estimate(&self, text: &str) -> LexicalScore {
        let tokens = tokenize(text);
        let mut matched = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&(mut polarity, mut subjectivity)) = self.lexicon.get(token.as_str()) else {
                continue;
            };
            if let Some(scale) = i
                .checked_sub(1)
                .and_then(|prev| self.intensifiers.get(tokens[prev].as_str()))
            {
                polarity = (polarity * scale).clamp(-1.0, 1.0);
                subjectivity = (subjectivity * scale).clamp(0.0, 1.0);
            }
            let window = &tokens[i.saturating_sub(NEGATION_REACH)..i];
            if window.iter().any(|t| NEGATIONS.contains(&t.as_str())) {
                polarity *= NEGATION_SCALE;
            }
            matched.push((polarity, subjectivity));
        }

        if matched.is_empty() {
            return LexicalScore::default();
        }

        let n = matched.len() as f64;
        let polarity = (matched.iter().map(|(p, _)| p).sum::<f64>() / n).clamp(-1.0, 1.0);
        let subjectivity = (matched.iter().map(|(_, s)| s).sum::<f64>() / n).clamp(0.0, 1.0);
        LexicalScore {
            polarity,
            subjectivity,
            label: label_for(polarity),
        }
    }
}

/// Map a polarity onto a label with the ±0.1 thresholds.
pub fn label_for(polarity: f64) -> SentimentLabel {
    if polarity > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if polarity < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
