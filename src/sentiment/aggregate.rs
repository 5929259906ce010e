//! Per-symbol roll-up of scored articles.

use crate::models::{LabelCounts, ScoredArticle, SentimentLabel, SentimentResult, SentimentSummary};
use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

/// Default look-back for windowed summaries.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Summarize a batch of results.
///
/// The overall score and confidence are arithmetic means; the overall label
/// is the majority with ties going positive, then negative, then neutral.
/// An empty batch is neutral with zero score and confidence.
pub fn summarize<'a, I>(symbol: &str, results: I, days: Option<u32>) -> SentimentSummary
where
    I: IntoIterator<Item = &'a SentimentResult>,
{
    let mut counts = LabelCounts::default();
    let mut score_sum = 0.0;
    let mut confidence_sum = 0.0;
    for result in results {
        counts.add(result.label);
        score_sum += result.score;
        confidence_sum += result.confidence;
    }

    let total = counts.total();
    let (overall_label, overall_score, confidence) = if total == 0 {
        (SentimentLabel::Neutral, 0.0, 0.0)
    } else {
        (
            counts.majority(),
            score_sum / total as f64,
            confidence_sum / total as f64,
        )
    };

    SentimentSummary {
        symbol: symbol.to_uppercase(),
        overall_label,
        overall_score,
        confidence,
        positive_count: counts.positive,
        negative_count: counts.negative,
        neutral_count: counts.neutral,
        total_articles: total,
        days_analyzed: days,
    }
}

/// Articles published no earlier than `days` before `now`.
///
/// Articles without a publication time are excluded. A window reaching
/// past the earliest representable date keeps every dated article.
pub fn within_window(articles: &[ScoredArticle], now: NaiveDateTime, days: u32) -> Vec<&ScoredArticle> {
    let cutoff = window_start(now, days);
    articles
        .iter()
        .filter(|scored| scored.article.published_at.is_some_and(|at| at >= cutoff))
        .collect()
}

/// Earliest publication time inside a `days` window ending at `now`.
pub fn window_start(now: NaiveDateTime, days: u32) -> NaiveDateTime {
    TimeDelta::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Summarize only the articles inside the look-back window.
pub fn summarize_window(
    symbol: &str,
    articles: &[ScoredArticle],
    now: NaiveDateTime,
    days: u32,
) -> SentimentSummary {
    let recent = within_window(articles, now, days);
    debug!(
        symbol,
        days,
        kept = recent.len(),
        dropped = articles.len() - recent.len(),
        "Applied summary window"
    );
    summarize(symbol, recent.iter().map(|scored| &scored.sentiment), Some(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use chrono::NaiveDate;
    use SentimentLabel::{Negative, Neutral, Positive};

    fn result(score: f64, label: SentimentLabel, confidence: f64) -> SentimentResult {
        SentimentResult {
            score,
            label,
            confidence,
            ..SentimentResult::default()
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 16).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn scored(days_ago: Option<i64>, label: SentimentLabel) -> ScoredArticle {
        ScoredArticle {
            article: Article {
                symbol: "AAPL".to_string(),
                title: "Apple headline".to_string(),
                link: format!("https://example.com/{days_ago:?}"),
                summary: None,
                source: None,
                published_at: days_ago.map(|d| now() - TimeDelta::days(d)),
            },
            sentiment: result(0.5, label, 1.0),
        }
    }

    #[test]
    fn test_summary_means_and_counts() {
        let results = vec![
            result(0.6, Positive, 1.0),
            result(0.4, Positive, 0.5),
            result(-0.5, Negative, 1.0),
        ];
        let summary = summarize("aapl", &results, None);
        assert_eq!(summary.symbol, "AAPL");
        assert_eq!(summary.overall_label, Positive);
        assert!((summary.overall_score - 0.5 / 3.0).abs() < 1e-9);
        assert!((summary.confidence - 2.5 / 3.0).abs() < 1e-9);
        assert_eq!(summary.positive_count, 2);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.neutral_count, 0);
        assert_eq!(summary.total_articles, 3);
    }

    #[test]
    fn test_tie_prefers_positive_then_negative() {
        let results = vec![result(0.5, Positive, 1.0), result(-0.5, Negative, 1.0)];
        assert_eq!(summarize("X", &results, None).overall_label, Positive);

        let results = vec![result(-0.5, Negative, 1.0), result(0.0, Neutral, 0.0)];
        assert_eq!(summarize("X", &results, None).overall_label, Negative);
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize("tsla", std::iter::empty(), Some(7));
        assert_eq!(summary.overall_label, Neutral);
        assert_eq!(summary.overall_score, 0.0);
        assert_eq!(summary.confidence, 0.0);
        assert_eq!(summary.total_articles, 0);
        assert_eq!(summary.days_analyzed, Some(7));
    }

    #[test]
    fn test_counts_add_up() {
        let results = vec![
            result(0.1, Neutral, 0.3),
            result(0.2, Positive, 0.6),
            result(-0.3, Negative, 0.9),
            result(0.0, Neutral, 0.0),
        ];
        let s = summarize("X", &results, None);
        assert_eq!(s.positive_count + s.negative_count + s.neutral_count, s.total_articles);
        assert_eq!(s.overall_label, Neutral);
    }

    #[test]
    fn test_window_excludes_old_and_undated() {
        let articles = vec![
            scored(Some(1), Positive),
            scored(Some(7), Negative),
            scored(Some(8), Negative),
            scored(None, Negative),
        ];
        let recent = within_window(&articles, now(), 7);
        assert_eq!(recent.len(), 2);

        let summary = summarize_window("AAPL", &articles, now(), 7);
        assert_eq!(summary.total_articles, 2);
        assert_eq!(summary.overall_label, Positive);
        assert_eq!(summary.days_analyzed, Some(7));
    }

    #[test]
    fn test_huge_window_keeps_every_dated_article() {
        assert_eq!(window_start(now(), u32::MAX), NaiveDateTime::MIN);

        let articles = vec![scored(Some(1), Positive), scored(Some(4000), Negative), scored(None, Negative)];
        let summary = summarize_window("AAPL", &articles, now(), u32::MAX);
        assert_eq!(summary.total_articles, 2);
        assert_eq!(summary.days_analyzed, Some(u32::MAX));
        assert_eq!(summarize_window("AAPL", &[], now(), u32::MAX).total_articles, 0);
    }

    #[test]
    fn test_window_start_is_inclusive_cutoff() {
        assert_eq!(window_start(now(), 0), now());
        assert_eq!(window_start(now(), 7), now() - TimeDelta::days(7));
    }
}
