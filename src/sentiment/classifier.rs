//! Multinomial naive Bayes headline classifier.
//!
//! Trained at construction from a `label<TAB>text` corpus, either the one
//! bundled with the crate or a file named in configuration. Blank lines and
//! lines starting with `#` are ignored; every label must be represented.

use super::Estimator;
use crate::models::{ClassifierScore, SentimentLabel};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Characters of input the classifier sees by default.
pub const DEFAULT_MAX_CHARS: usize = 512;

const BUNDLED_CORPUS: &str = include_str!("../../assets/headline_corpus.tsv");
const SMOOTHING: f64 = 1.0;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will", "with",
];

/// Why a classifier could not be trained.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The configured corpus file could not be read.
    #[error("cannot read corpus {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus has no examples for one of the labels.
    #[error("corpus has no {0} examples")]
    MissingLabel(SentimentLabel),
}

/// Trained classifier. Log-probabilities are indexed like [`SentimentLabel::ORDERED`].
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    log_priors: [f64; 3],
    log_likelihoods: HashMap<String, [f64; 3]>,
    max_chars: usize,
}

impl NaiveBayesClassifier {
    /// Train on the headline corpus shipped with the crate.
    pub fn bundled() -> Result<Self, ClassifierError> {
        Self::from_corpus(BUNDLED_CORPUS)
    }

    /// Train on a `label<TAB>text` file.
    ///
    /// # Errors
    ///
    /// [`ClassifierError::Io`] when the file cannot be read, and
    /// [`ClassifierError::MissingLabel`] when a label has no examples.
    pub fn from_path(path: &Path) -> Result<Self, ClassifierError> {
        let corpus = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Training classifier from corpus file");
        Self::from_corpus(&corpus)
    }

    /// Train on corpus text already in memory.
    pub fn from_corpus(corpus: &str) -> Result<Self, ClassifierError> {
        let examples = corpus
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let parsed = line
                    .split_once('\t')
                    .and_then(|(label, text)| SentimentLabel::from_name(label).map(|l| (l, text)));
                if parsed.is_none() {
                    debug!(line, "Skipping malformed corpus line");
                }
                parsed
            });
        Self::train(examples)
    }

    /// Fit priors and Laplace-smoothed word likelihoods.
    pub fn train<'a, I>(examples: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = (SentimentLabel, &'a str)>,
    {
        let mut documents = [0usize; 3];
        let mut word_totals = [0usize; 3];
        let mut word_counts: HashMap<String, [usize; 3]> = HashMap::new();

        for (label, text) in examples {
            let class = index_of(label);
            documents[class] += 1;
            for token in tokenize(text) {
                word_counts.entry(token).or_default()[class] += 1;
                word_totals[class] += 1;
            }
        }

        for label in SentimentLabel::ORDERED {
            if documents[index_of(label)] == 0 {
                return Err(ClassifierError::MissingLabel(label));
            }
        }

        let total_documents: usize = documents.iter().sum();
        let vocabulary = word_counts.len() as f64;
        let log_priors = documents.map(|n| (n as f64 / total_documents as f64).ln());
        let log_likelihoods = word_counts
            .into_iter()
            .map(|(word, counts)| {
                let mut logs = [0.0; 3];
                for class in 0..3 {
                    logs[class] = ((counts[class] as f64 + SMOOTHING)
                        / (word_totals[class] as f64 + SMOOTHING * vocabulary))
                        .ln();
                }
                (word, logs)
            })
            .collect::<HashMap<_, _>>();

        debug!(
            documents = total_documents,
            vocabulary = log_likelihoods.len(),
            "Classifier trained"
        );
        Ok(Self {
            log_priors,
            log_likelihoods,
            max_chars: DEFAULT_MAX_CHARS,
        })
    }

    /// Cut classifier input to `max_chars` characters.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Posterior per label in [`SentimentLabel::ORDERED`] order, or `None`
    /// when no word of `text` was seen in training.
    pub fn posteriors(&self, text: &str) -> Option<[f64; 3]> {
        let truncated: String = text.chars().take(self.max_chars).collect();
        let mut scores = self.log_priors;
        let mut known = 0usize;
        for token in tokenize(&truncated) {
            if let Some(logs) = self.log_likelihoods.get(&token) {
                known += 1;
                for class in 0..3 {
                    scores[class] += logs[class];
                }
            }
        }
        if known == 0 {
            return None;
        }

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp = scores.map(|s| (s - max).exp());
        let total: f64 = exp.iter().sum();
        Some(exp.map(|e| e / total))
    }
}

impl Estimator for NaiveBayesClassifier {
    type Output = ClassifierScore;

    fn name(&self) -> &'static str {
        "classifier"
    }

    fn estimate(&self, text: &str) -> ClassifierScore {
        let Some(posteriors) = self.posteriors(text) else {
            return ClassifierScore::default();
        };
        let mut best = 0;
        for class in 1..3 {
            if posteriors[class] > posteriors[best] {
                best = class;
            }
        }
        ClassifierScore {
            label: SentimentLabel::ORDERED[best],
            score: posteriors[best],
        }
    }
}

fn index_of(label: SentimentLabel) -> usize {
    match label {
        SentimentLabel::Positive => 0,
        SentimentLabel::Negative => 1,
        SentimentLabel::Neutral => 2,
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
}
