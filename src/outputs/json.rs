//! JSON report files.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-10-16/
//!     ├── AAPL.json
//!     ├── TSLA.json
//!     └── index.json
//! ```
//!
//! The date directory comes from each report's `generated_at`, so a run
//! crossing midnight keeps its reports together only when the caller
//! passes one timestamp for the whole batch.

use crate::models::{SentimentLabel, SymbolReport};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// One line of the run index for a symbol that produced a report.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndexEntry {
    pub symbol: String,
    pub overall_sentiment: SentimentLabel,
    pub sentiment_score: f64,
    pub total_articles: usize,
    pub file: String,
}

/// A symbol that failed, with the error that stopped it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FailedSymbol {
    pub symbol: String,
    pub error: String,
}

/// Summary of one batch run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunIndex {
    pub generated_at: NaiveDateTime,
    pub processed: Vec<IndexEntry>,
    pub failed: Vec<FailedSymbol>,
}

impl RunIndex {
    /// Empty index stamped with the batch time.
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            processed: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Add a successful symbol.
    ///
    /// # Arguments
    ///
    /// * `report` - The written report; its summary fills the index entry
    ///
    /// The entry's `file` is the report file name relative to the date directory.
    pub fn record(&mut self, report: &SymbolReport) {
        self.processed.push(IndexEntry {
            symbol: report.symbol.clone(),
            overall_sentiment: report.summary.overall_label,
            sentiment_score: report.summary.overall_score,
            total_articles: report.summary.total_articles,
            file: report_file_name(&report.symbol),
        });
    }

    /// Add a failed symbol with the error that stopped it.
    pub fn record_failure(&mut self, symbol: &str, error: &dyn Error) {
        self.failed.push(FailedSymbol {
            symbol: symbol.to_string(),
            error: error.to_string(),
        });
    }
}

fn report_file_name(symbol: &str) -> String {
    format!("{}.json", symbol.to_uppercase())
}

fn date_dir(json_output_dir: &str, date: NaiveDate) -> PathBuf {
    PathBuf::from(json_output_dir).join(date.to_string())
}

async fn write_json<T: Serialize>(dir: PathBuf, file_name: &str, value: &T) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }
    let path = dir.join(file_name);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON file");
    Ok(path)
}

/// Write `{json_output_dir}/{date}/{SYMBOL}.json`.
#[instrument(level = "info", skip_all, fields(symbol = %report.symbol, json_output_dir = %json_output_dir))]
pub async fn write_report(report: &SymbolReport, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let dir = date_dir(json_output_dir, report.generated_at.date());
    write_json(dir, &report_file_name(&report.symbol), report).await
}

/// Write `{json_output_dir}/{date}/index.json`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_index(index: &RunIndex, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let dir = date_dir(json_output_dir, index.generated_at.date());
    write_json(dir, "index.json", index).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SentimentSummary, StockSnapshot};

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 16).unwrap().and_hms_opt(11, 5, 0).unwrap()
    }

    fn report(symbol: &str) -> SymbolReport {
        SymbolReport {
            symbol: symbol.to_string(),
            generated_at: generated_at(),
            snapshot: Some(StockSnapshot::empty(symbol)),
            articles: Vec::new(),
            summary: SentimentSummary {
                symbol: symbol.to_string(),
                overall_label: SentimentLabel::Neutral,
                overall_score: 0.0,
                confidence: 0.0,
                positive_count: 0,
                negative_count: 0,
                neutral_count: 0,
                total_articles: 0,
                days_analyzed: Some(7),
            },
            rows_seen: 0,
            rows_skipped: 0,
            skip_reasons: Vec::new(),
            filtered_out: 0,
        }
    }

    fn temp_dir(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("finviz_sentiment_{name}_{}", std::process::id()))
            .to_string_lossy()
            .to_string()
    }

    #[tokio::test]
    async fn test_write_report_layout() {
        let dir = temp_dir("report");
        let path = write_report(&report("TSLA"), &dir).await.unwrap();
        assert!(path.ends_with("2025-10-16/TSLA.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["symbol"], "TSLA");
        assert_eq!(value["summary"]["overall_sentiment"], "neutral");
        assert_eq!(value["generated_at"], "2025-10-16T11:05:00");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_index() {
        let dir = temp_dir("index");
        let mut index = RunIndex::new(generated_at());
        index.record(&report("AAPL"));
        index.record_failure("ZZZZ", &std::io::Error::other("404 Not Found"));
        let path = write_index(&index, &dir).await.unwrap();
        assert!(path.ends_with("2025-10-16/index.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        let back: RunIndex = serde_json::from_str(&text).unwrap();
        assert_eq!(back.processed[0].file, "AAPL.json");
        assert_eq!(back.failed[0].symbol, "ZZZZ");
        assert_eq!(back.failed[0].error, "404 Not Found");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
