//! Data models for scraped news, quote snapshots and sentiment records.
//!
//! This module defines the plain records exchanged between the extraction
//! engine, the sentiment engine and the output layer:
//! - [`Article`]: one news row for a symbol after parsing
//! - [`StockSnapshot`]: one point-in-time set of quote/fundamental fields
//! - [`SentimentResult`]: fused polarity for one article plus every sub-score
//! - [`SentimentSummary`]: per-symbol roll-up over a time window
//! - [`RowOutcome`] / [`SkipReason`]: per-row parse result so skipped rows stay observable
//!
//! None of these types carry behavior beyond small accessors; they are meant
//! for direct serialization by the output layer.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency assumed when the quote table does not state one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A news item attached to a ticker.
///
/// `link` is the identity key: two articles with the same link are the
/// same article, whatever their titles say.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// Uppercase ticker the article was scraped for.
    pub symbol: String,
    /// Anchor text as displayed in the news table.
    pub title: String,
    /// Absolute URL of the story. Never empty.
    pub link: String,
    /// Short summary text, when the source provides one.
    pub summary: Option<String>,
    /// Publisher name shown next to the headline.
    pub source: Option<String>,
    /// Local publication timestamp; midnight when only the date is known.
    pub published_at: Option<NaiveDateTime>,
}

/// Quote and fundamentals for one symbol, as read from the snapshot table.
///
/// Numeric fields are `None` when the source shows nothing (or `-`), never zero.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<i64>,
    pub avg_volume: Option<i64>,
    /// Kept exactly as formatted by the source (e.g. `"2.95T"`).
    pub market_cap: Option<String>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub ipo_date: Option<NaiveDate>,
    pub currency: String,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    pub rsi: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
}

impl StockSnapshot {
    /// An empty snapshot for `symbol` with every optional field absent.
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            name: String::new(),
            price: None,
            change: None,
            change_percent: None,
            volume: None,
            avg_volume: None,
            market_cap: None,
            pe_ratio: None,
            eps: None,
            dividend: None,
            dividend_yield: None,
            sector: None,
            industry: None,
            country: None,
            exchange: None,
            ipo_date: None,
            currency: DEFAULT_CURRENCY.to_string(),
            high_52w: None,
            low_52w: None,
            rsi: None,
            sma_20: None,
            sma_50: None,
            sma_200: None,
        }
    }
}

/// Categorical sentiment.
///
/// The declaration order is also the tie-break priority used by every
/// majority vote in the crate: positive, then negative, then neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    /// All labels in tie-break priority order.
    pub const ORDERED: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Lowercase name as written in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    /// Parse a classifier or corpus label, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Some(SentimentLabel::Positive),
            "negative" | "neg" => Some(SentimentLabel::Negative),
            "neutral" | "neu" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tally of labels, with majority selection using [`SentimentLabel::ORDERED`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl LabelCounts {
    /// Tally an iterator of labels.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = SentimentLabel>,
    {
        let mut counts = Self::default();
        for label in labels {
            counts.add(label);
        }
        counts
    }

    /// Count one more `label`.
    pub fn add(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    /// Count for one label.
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    /// Sum over every label.
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// First label with the highest count; an empty tally is neutral.
    pub fn majority(&self) -> SentimentLabel {
        if self.total() == 0 {
            return SentimentLabel::Neutral;
        }
        let mut best = SentimentLabel::ORDERED[0];
        for label in SentimentLabel::ORDERED {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }
}

/// Output of the lexical polarity/subjectivity scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct LexicalScore {
    /// In `[-1, 1]`.
    pub polarity: f64,
    /// In `[0, 1]`.
    pub subjectivity: f64,
    pub label: SentimentLabel,
}

/// Output of the compound lexicon scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct CompoundScore {
    /// Normalized sum of valences in `[-1, 1]`.
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub label: SentimentLabel,
}

/// Output of the short-text classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ClassifierScore {
    pub label: SentimentLabel,
    /// Posterior probability of `label`, `0.0` when the classifier did not run.
    pub score: f64,
}

/// Fused sentiment for one piece of text.
///
/// The sub-scores are kept so every fused value can be audited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct SentimentResult {
    /// Weighted fused polarity in `[-1, 1]`.
    pub score: f64,
    pub label: SentimentLabel,
    /// Share of contributing estimators that agree with `label`, in `[0, 1]`.
    pub confidence: f64,
    pub lexical: LexicalScore,
    pub compound: CompoundScore,
    pub classifier: ClassifierScore,
}

impl SentimentResult {
    /// The record returned when there is nothing to score.
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Sentiment roll-up for one symbol over one time window.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SentimentSummary {
    pub symbol: String,
    #[serde(rename = "overall_sentiment")]
    pub overall_label: SentimentLabel,
    #[serde(rename = "sentiment_score")]
    pub overall_score: f64,
    pub confidence: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total_articles: usize,
    /// Window length the summary covers, when it was windowed.
    pub days_analyzed: Option<u32>,
}

/// An article together with its sentiment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub sentiment: SentimentResult,
}

/// Why a table row did not produce an article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer than two `td` cells (header, spacer or layout rows).
    TooFewCells { found: usize },
    /// The title cell holds no hyperlink.
    MissingAnchor,
    /// The hyperlink has no usable `href`.
    EmptyLink,
    /// The `href` could not be resolved against the base origin.
    UnresolvableLink { href: String },
}

impl SkipReason {
    /// Stable identifier used when tallying reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::TooFewCells { .. } => "too_few_cells",
            SkipReason::MissingAnchor => "missing_anchor",
            SkipReason::EmptyLink => "empty_link",
            SkipReason::UnresolvableLink { .. } => "unresolvable_link",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewCells { found } => write!(f, "row has {found} cell(s), need 2"),
            SkipReason::MissingAnchor => f.write_str("title cell has no hyperlink"),
            SkipReason::EmptyLink => f.write_str("hyperlink has an empty href"),
            SkipReason::UnresolvableLink { href } => write!(f, "cannot resolve href {href:?}"),
        }
    }
}

/// Result of parsing one table row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(Article),
    Skipped(SkipReason),
}

impl RowOutcome {
    /// The parsed article, or `None` for a skipped row.
    pub fn article(self) -> Option<Article> {
        match self {
            RowOutcome::Parsed(article) => Some(article),
            RowOutcome::Skipped(_) => None,
        }
    }
}

/// Everything produced for one symbol in one run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    /// Local time the report was assembled, `YYYY-MM-DDTHH:MM:SS`.
    pub generated_at: NaiveDateTime,
    pub snapshot: Option<StockSnapshot>,
    pub articles: Vec<ScoredArticle>,
    pub summary: SentimentSummary,
    /// Rows found in the located news table.
    pub rows_seen: usize,
    /// Rows that produced no article.
    pub rows_skipped: usize,
    /// Skip reasons with their occurrence counts.
    pub skip_reasons: Vec<(String, usize)>,
    /// Parsed articles dropped as duplicates or as unrelated to the symbol.
    pub filtered_out: usize,
}
