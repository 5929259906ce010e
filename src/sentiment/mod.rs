//! Multi-method sentiment scoring for headlines.
//!
//! Three independent estimators look at the same cleaned text:
//!
//! | Estimator | Module | Output | Label thresholds |
//! |-----------|--------|--------|------------------|
//! | Lexical polarity | [`lexical`] | polarity + subjectivity | `> 0.1` / `< -0.1` |
//! | Compound lexicon | [`compound`] | compound + pos/neg/neu shares | `>= 0.05` / `<= -0.05` |
//! | Short-text classifier | [`classifier`] | label + posterior | its own argmax |
//!
//! [`fuse`] turns the three outputs into one label (majority vote, ties
//! going to positive, then negative), one score (weighted mean of the
//! nonzero contributions) and one confidence (agreeing / contributing).
//!
//! Each estimator is optional. One that is switched off or fails to build
//! is replaced by a [`Disabled`] null object for the life of the engine, so
//! scoring never fails; it only loses confidence.

pub mod aggregate;
pub mod classifier;
pub mod clean;
pub mod compound;
pub mod lexical;

use crate::models::{
    Article, ClassifierScore, CompoundScore, LabelCounts, LexicalScore, ScoredArticle,
    SentimentLabel, SentimentResult,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Weight of the lexical polarity in the fused score.
pub const LEXICAL_WEIGHT: f64 = 0.3;
/// Weight of the compound score in the fused score.
pub const COMPOUND_WEIGHT: f64 = 0.4;
/// Weight of the signed classifier posterior in the fused score.
pub const CLASSIFIER_WEIGHT: f64 = 0.3;

/// Error type estimator constructors report.
pub type BuildError = Box<dyn Error + Send + Sync>;

/// A sentiment estimator over cleaned text.
pub trait Estimator: Send + Sync {
    type Output;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Score `text`. Must not panic on any input.
    fn estimate(&self, text: &str) -> Self::Output;
}

/// Stand-in for an estimator that is unavailable. Always returns the default output.
pub struct Disabled<T> {
    name: &'static str,
    _output: PhantomData<fn() -> T>,
}

impl<T> Disabled<T> {
    /// Null estimator logged under `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _output: PhantomData,
        }
    }
}

impl<T: Default> Estimator for Disabled<T> {
    type Output = T;

    fn name(&self) -> &'static str {
        self.name
    }

    fn estimate(&self, _text: &str) -> T {
        T::default()
    }
}

/// Which estimators to build, and how the classifier is set up.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SentimentSettings {
    pub lexical: bool,
    pub compound: bool,
    pub classifier: bool,
    /// Characters of input the classifier sees; longer text is cut.
    pub classifier_max_chars: usize,
    /// `label<TAB>text` training file replacing the bundled corpus.
    pub classifier_corpus: Option<PathBuf>,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            lexical: true,
            compound: true,
            classifier: true,
            classifier_max_chars: classifier::DEFAULT_MAX_CHARS,
            classifier_corpus: None,
        }
    }
}

/// Which estimators are live in an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub lexical: bool,
    pub compound: bool,
    pub classifier: bool,
}

/// Fused label, score and confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fused {
    pub score: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
}

/// Combine the three estimator outputs.
///
/// Zero contributions are left out of both numerator and denominator of
/// the weighted mean, and out of the confidence denominator.
pub fn fuse(lexical: &LexicalScore, compound: &CompoundScore, classifier: &ClassifierScore) -> Fused {
    let counts = LabelCounts::from_labels([lexical.label, compound.label, classifier.label]);
    let label = counts.majority();

    // A neutral classifier signs to 0.0 and is left out of the weights even
    // with a high posterior. CLASSIFIER_WEIGHT is only added for a positive
    // or negative verdict.
    let classifier_signed = match classifier.label {
        SentimentLabel::Positive => classifier.score,
        SentimentLabel::Negative => -classifier.score,
        SentimentLabel::Neutral => 0.0,
    };

    let contributions = [
        (lexical.polarity, LEXICAL_WEIGHT),
        (compound.compound, COMPOUND_WEIGHT),
        (classifier_signed, CLASSIFIER_WEIGHT),
    ];
    let (weighted, total_weight, contributing) = contributions
        .iter()
        .filter(|(score, _)| *score != 0.0)
        .fold((0.0, 0.0, 0usize), |(sum, weights, n), (score, weight)| {
            (sum + score * weight, weights + weight, n + 1)
        });

    let score = if total_weight > 0.0 {
        (weighted / total_weight).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let confidence = if contributing > 0 {
        (counts.get(label) as f64 / contributing as f64).min(1.0)
    } else {
        0.0
    };

    Fused {
        score,
        label,
        confidence,
    }
}

/// The fused scorer. Build once and share by reference.
pub struct SentimentEngine {
    lexical: Box<dyn Estimator<Output = LexicalScore>>,
    compound: Box<dyn Estimator<Output = CompoundScore>>,
    classifier: Box<dyn Estimator<Output = ClassifierScore>>,
    status: EngineStatus,
}

impl std::fmt::Debug for SentimentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentEngine")
            .field("lexical", &self.lexical.name())
            .field("compound", &self.compound.name())
            .field("classifier", &self.classifier.name())
            .field("status", &self.status)
            .finish()
    }
}

impl SentimentEngine {
    /// Build every enabled estimator. Failures are logged once and the
    /// estimator is replaced by [`Disabled`].
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: &SentimentSettings) -> Self {
        let (lexical, lexical_ok) = build("lexical", settings.lexical, || {
            Ok(lexical::LexicalScorer::new())
        });
        let (compound, compound_ok) = build("compound", settings.compound, || {
            Ok(compound::CompoundScorer::new())
        });
        let max_chars = settings.classifier_max_chars;
        let corpus = settings.classifier_corpus.clone();
        let (classifier, classifier_ok) = build("classifier", settings.classifier, move || {
            let model = match corpus {
                Some(path) => classifier::NaiveBayesClassifier::from_path(&path)?,
                None => classifier::NaiveBayesClassifier::bundled()?,
            };
            Ok(model.with_max_chars(max_chars))
        });

        let status = EngineStatus {
            lexical: lexical_ok,
            compound: compound_ok,
            classifier: classifier_ok,
        };
        info!(?status, "Sentiment engine ready");
        Self {
            lexical,
            compound,
            classifier,
            status,
        }
    }

    /// Assemble an engine from ready-made estimators.
    pub fn from_estimators(
        lexical: Box<dyn Estimator<Output = LexicalScore>>,
        compound: Box<dyn Estimator<Output = CompoundScore>>,
        classifier: Box<dyn Estimator<Output = ClassifierScore>>,
    ) -> Self {
        Self {
            lexical,
            compound,
            classifier,
            status: EngineStatus {
                lexical: true,
                compound: true,
                classifier: true,
            },
        }
    }

    /// Which estimators were built successfully.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Score arbitrary text.
    ///
    /// Text that is empty after cleaning yields [`SentimentResult::neutral`]
    /// without running any estimator.
    pub fn analyze_text(&self, text: &str) -> SentimentResult {
        let cleaned = clean::clean_text(text);
        if cleaned.is_empty() {
            return SentimentResult::neutral();
        }

        let lexical = self.lexical.estimate(&cleaned);
        let compound = self.compound.estimate(&cleaned);
        let classifier = self.classifier.estimate(&cleaned);
        let fused = fuse(&lexical, &compound, &classifier);
        debug!(
            text = %crate::utils::truncate_for_log(&cleaned, 80),
            score = fused.score,
            label = %fused.label,
            confidence = fused.confidence,
            "Scored text"
        );

        SentimentResult {
            score: fused.score,
            label: fused.label,
            confidence: fused.confidence,
            lexical,
            compound,
            classifier,
        }
    }

    /// Score a title with its optional summary appended.
    pub fn analyze_article(&self, title: &str, summary: Option<&str>) -> SentimentResult {
        match summary.map(str::trim).filter(|s| !s.is_empty()) {
            Some(summary) => self.analyze_text(&format!("{title} {summary}")),
            None => self.analyze_text(title),
        }
    }

    /// Score every article, keeping order.
    pub fn score_articles(&self, articles: Vec<Article>) -> Vec<ScoredArticle> {
        articles
            .into_iter()
            .map(|article| {
                let sentiment = self.analyze_article(&article.title, article.summary.as_deref());
                ScoredArticle { article, sentiment }
            })
            .collect()
    }
}

fn build<T, E, F>(
    name: &'static str,
    enabled: bool,
    construct: F,
) -> (Box<dyn Estimator<Output = T>>, bool)
where
    T: Default + 'static,
    E: Estimator<Output = T> + 'static,
    F: FnOnce() -> Result<E, BuildError>,
{
    if !enabled {
        info!(estimator = name, "Estimator disabled by configuration");
        return (Box::new(Disabled::<T>::new(name)), false);
    }
    match construct() {
        Ok(estimator) => (Box::new(estimator), true),
        Err(e) => {
            warn!(estimator = name, error = %e, "Estimator unavailable; it will contribute neutral defaults");
            (Box::new(Disabled::<T>::new(name)), false)
        }
    }
}

/// Lazily built, process-wide engine handle.
///
/// The engine is constructed on the first call to [`EngineHandle::engine`]
/// and at most once, even under concurrent first use.
#[derive(Debug)]
pub struct EngineHandle {
    settings: SentimentSettings,
    engine: OnceCell<SentimentEngine>,
}

impl EngineHandle {
    /// Store `settings` without building anything yet.
    pub fn new(settings: SentimentSettings) -> Self {
        Self {
            settings,
            engine: OnceCell::new(),
        }
    }

    /// The shared engine, built on the first call.
    ///
    /// # Returns
    ///
    /// The same engine on every call. Concurrent first callers block until
    /// the single build finishes.
    pub fn engine(&self) -> &SentimentEngine {
        self.engine.get_or_init(|| SentimentEngine::new(&self.settings))
    }

    /// Whether the engine has been built.
    pub fn is_ready(&self) -> bool {
        self.engine.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed<T: Copy> {
        output: T,
        calls: Arc<AtomicUsize>,
    }

    impl<T: Copy + Send + Sync> Estimator for Fixed<T> {
        type Output = T;

        fn name(&self) -> &'static str {
            "fixed"
        }

        fn estimate(&self, _text: &str) -> T {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output
        }
    }

    fn lex(polarity: f64, label: SentimentLabel) -> LexicalScore {
        LexicalScore {
            polarity,
            subjectivity: 0.5,
            label,
        }
    }

    fn comp(compound: f64, label: SentimentLabel) -> CompoundScore {
        CompoundScore {
            compound,
            label,
            ..CompoundScore::default()
        }
    }

    fn cls(score: f64, label: SentimentLabel) -> ClassifierScore {
        ClassifierScore { label, score }
    }

    use SentimentLabel::{Negative, Neutral, Positive};

    #[test]
    fn test_fuse_majority_vote() {
        let fused = fuse(&lex(0.5, Positive), &comp(0.6, Positive), &cls(0.9, Negative));
        assert_eq!(fused.label, Positive);
        let expected = (0.5 * 0.3 + 0.6 * 0.4 - 0.9 * 0.3) / 1.0;
        assert!((fused.score - expected).abs() < 1e-9);
        assert!((fused.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_three_way_tie_is_positive() {
        let fused = fuse(&lex(0.3, Positive), &comp(-0.4, Negative), &cls(0.8, Neutral));
        assert_eq!(fused.label, Positive);
    }

    #[test]
    fn test_fuse_excludes_zero_contributions_from_weights() {
        let fused = fuse(&lex(0.0, Neutral), &comp(0.5, Positive), &cls(0.7, Neutral));
        assert!((fused.score - 0.5).abs() < 1e-9);
        assert_eq!(fused.label, Neutral);
        assert_eq!(fused.confidence, 1.0);
    }

    #[test]
    fn test_fuse_nothing_contributed() {
        let fused = fuse(
            &LexicalScore::default(),
            &CompoundScore::default(),
            &ClassifierScore::default(),
        );
        assert_eq!(fused.score, 0.0);
        assert_eq!(fused.label, Neutral);
        assert_eq!(fused.confidence, 0.0);
    }

    #[test]
    fn test_fuse_negative_classifier_is_negated() {
        let fused = fuse(&lex(0.0, Neutral), &comp(0.0, Neutral), &cls(0.8, Negative));
        assert!((fused.score + 0.8).abs() < 1e-9);
        assert_eq!(fused.label, Neutral);
        assert_eq!(fused.confidence, 1.0);
    }

    #[test]
    fn test_empty_text_skips_estimators() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = SentimentEngine::from_estimators(
            Box::new(Fixed { output: lex(0.9, Positive), calls: calls.clone() }),
            Box::new(Fixed { output: comp(0.9, Positive), calls: calls.clone() }),
            Box::new(Fixed { output: cls(0.9, Positive), calls: calls.clone() }),
        );
        assert_eq!(engine.analyze_text(""), SentimentResult::neutral());
        assert_eq!(engine.analyze_text("  <br/> https://t.co/abc  "), SentimentResult::neutral());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_analyze_keeps_sub_scores() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = SentimentEngine::from_estimators(
            Box::new(Fixed { output: lex(0.4, Positive), calls: calls.clone() }),
            Box::new(Fixed { output: comp(0.6, Positive), calls: calls.clone() }),
            Box::new(Fixed { output: cls(0.7, Neutral), calls: calls.clone() }),
        );
        let result = engine.analyze_article("Shares rally", Some("after earnings"));
        assert_eq!(result.label, Positive);
        assert_eq!(result.lexical.polarity, 0.4);
        assert_eq!(result.compound.compound, 0.6);
        assert_eq!(result.classifier.score, 0.7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_all_disabled_engine_is_neutral_with_zero_confidence() {
        let settings = SentimentSettings {
            lexical: false,
            compound: false,
            classifier: false,
            ..SentimentSettings::default()
        };
        let engine = SentimentEngine::new(&settings);
        let result = engine.analyze_text("Stock market crashes amid panic");
        assert_eq!(result.label, Neutral);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            engine.status(),
            EngineStatus { lexical: false, compound: false, classifier: false }
        );
    }

    #[test]
    fn test_missing_corpus_disables_only_classifier() {
        let settings = SentimentSettings {
            classifier_corpus: Some(PathBuf::from("/nonexistent/corpus.tsv")),
            ..SentimentSettings::default()
        };
        let engine = SentimentEngine::new(&settings);
        let status = engine.status();
        assert!(status.lexical && status.compound);
        assert!(!status.classifier);
        let result = engine.analyze_text("Shares surge to a great record high");
        assert_eq!(result.classifier, ClassifierScore::default());
        assert_eq!(result.label, Positive);
    }

    #[test]
    fn test_default_engine_scores_positive_headline() {
        let engine = SentimentEngine::new(&SentimentSettings::default());
        let result = engine.analyze_article("Tesla Stock Surges on Deliveries", None);
        assert_eq!(result.label, Positive);
        assert!(result.score > 0.0);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn test_default_engine_scores_negative_headline() {
        let engine = SentimentEngine::new(&SentimentSettings::default());
        let result = engine.analyze_article(
            "Stock Market Crashes Amid Economic Uncertainty",
            Some("Major stock indices plummeted today as investors worry about inflation."),
        );
        assert_eq!(result.label, Negative);
        assert!(result.score < 0.0);
    }

    #[test]
    fn test_engine_handle_builds_once() {
        let handle = EngineHandle::new(SentimentSettings::default());
        assert!(!handle.is_ready());
        let first = handle.engine() as *const SentimentEngine;
        assert!(handle.is_ready());
        let second = handle.engine() as *const SentimentEngine;
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_articles_keeps_order() {
        let engine = SentimentEngine::new(&SentimentSettings::default());
        let make = |title: &str, link: &str| Article {
            symbol: "TSLA".to_string(),
            title: title.to_string(),
            link: link.to_string(),
            summary: None,
            source: None,
            published_at: None,
        };
        let scored = engine.score_articles(vec![
            make("Tesla shares plunge after recall", "https://x.com/1"),
            make("Tesla rallies to record high", "https://x.com/2"),
        ]);
        assert_eq!(scored[0].article.link, "https://x.com/1");
        assert_eq!(scored[1].article.link, "https://x.com/2");
        assert_eq!(scored[0].sentiment.label, Negative);
        assert_eq!(scored[1].sentiment.label, Positive);
    }
}
