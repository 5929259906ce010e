//! Finviz quote page scraper.
//!
//! One request per symbol: `{base}/quote.ashx?t={SYMBOL}` returns a page with
//! both the news table and the snapshot table, so news and fundamentals come
//! from the same document.
//!
//! Parsing is split from fetching: [`extract_news`] and [`extract_snapshot`]
//! work on an already parsed [`Html`] and never fail, while
//! [`scrape_symbol`] does the I/O through any [`FetchPage`].

use crate::extract::relevance::{AliasTable, RelevanceFilter};
use crate::extract::row::RowParser;
use crate::extract::{snapshot, table};
use crate::fetch::FetchPage;
use crate::models::{Article, RowOutcome, StockSnapshot, SymbolReport};
use crate::sentiment::SentimentEngine;
use crate::sentiment::aggregate;
use chrono::NaiveDateTime;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Site origin used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://finviz.com";

/// Commonly traded symbols for batch runs.
pub const POPULAR_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "BRK-B", "UNH", "JNJ", "JPM", "V",
    "PG", "HD", "MA", "DIS", "PYPL", "ADBE", "NFLX", "CRM", "INTC", "CMCSA", "PFE", "ABT", "TMO",
    "COST", "PEP", "WMT", "DHR", "VZ", "ACN", "NKE", "TXN", "QCOM", "NEE", "HON", "UNP", "IBM",
    "AMGN", "PM", "SPGI", "RTX", "LOW", "SBUX", "AMD", "INTU", "CAT", "GS", "AXP", "BLK", "SYK",
    "GILD", "CVS", "MDT",
];

/// Sector name → member symbols.
pub const SECTORS: &[(&str, &[&str])] = &[
    ("Technology", &["AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "ADBE", "CRM", "INTC", "AMD"]),
    ("Healthcare", &["JNJ", "UNH", "PFE", "ABT", "TMO", "DHR", "AMGN", "GILD", "MDT", "SYK"]),
    ("Financial", &["BRK-B", "JPM", "V", "MA", "BAC", "WFC", "GS", "AXP", "BLK", "SPGI"]),
    ("Consumer", &["PG", "HD", "DIS", "COST", "PEP", "WMT", "NKE", "SBUX", "LOW", "TGT"]),
    ("Industrial", &["HON", "UNP", "CAT", "RTX", "LMT", "BA", "GE", "MMM", "UPS", "FDX"]),
];

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid row selector"));

/// Symbols of a sector, matched case-insensitively. Unknown sectors are empty.
pub fn sector_symbols(sector: &str) -> &'static [&'static str] {
    SECTORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sector.trim()))
        .map(|(_, symbols)| *symbols)
        .unwrap_or(&[])
}

/// `{base}/quote.ashx?t={SYMBOL}` with the symbol uppercased and URL-encoded.
pub fn quote_url(base: &Url, symbol: &str) -> Result<Url, url::ParseError> {
    let encoded = urlencoding::encode(&symbol.trim().to_uppercase()).into_owned();
    base.join(&format!("quote.ashx?t={encoded}"))
}

/// Articles pulled from one page, with row accounting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsExtraction {
    pub articles: Vec<Article>,
    /// Strategy that located the table, `None` when no table was found.
    pub table_strategy: Option<&'static str>,
    pub rows_seen: usize,
    pub rows_skipped: usize,
    /// Skip reasons with counts, sorted by reason.
    pub skip_reasons: Vec<(String, usize)>,
    /// Parsed articles removed as duplicates or unrelated.
    pub filtered_out: usize,
}

/// Locate the news table, parse every row, then dedupe and filter for relevance.
///
/// A page without a news table yields an empty extraction.
#[instrument(level = "debug", skip(document, base, aliases, now))]
pub fn extract_news(
    document: &Html,
    symbol: &str,
    base: &Url,
    aliases: &AliasTable,
    now: NaiveDateTime,
) -> NewsExtraction {
    let Some(located) = table::locate_news_table(document, symbol) else {
        warn!(symbol, "No news table found");
        return NewsExtraction::default();
    };

    let parser = RowParser::new(symbol, base.clone(), now);
    let mut parsed = Vec::new();
    let mut skipped = Vec::new();
    for row in located.element.select(&ROW) {
        match parser.parse(row) {
            RowOutcome::Parsed(article) => parsed.push(article),
            RowOutcome::Skipped(reason) => {
                debug!(symbol, %reason, "Skipping news row");
                skipped.push(reason);
            }
        }
    }

    let rows_seen = parsed.len() + skipped.len();
    let candidates = parsed.len();
    let articles = RelevanceFilter::new(symbol, aliases).apply(parsed);
    let skip_reasons = skipped
        .iter()
        .map(|reason| reason.kind().to_string())
        .counts()
        .into_iter()
        .sorted()
        .collect();

    NewsExtraction {
        filtered_out: candidates - articles.len(),
        articles,
        table_strategy: Some(located.strategy),
        rows_seen,
        rows_skipped: skipped.len(),
        skip_reasons,
    }
}

/// Fundamentals from the snapshot table, `None` when it is missing or nameless.
pub fn extract_snapshot(document: &Html, symbol: &str) -> Option<StockSnapshot> {
    snapshot::parse_snapshot_table(snapshot::locate_snapshot_table(document), symbol)
}

/// Everything extracted from one quote page.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePage {
    pub symbol: String,
    pub news: NewsExtraction,
    pub snapshot: Option<StockSnapshot>,
}

impl QuotePage {
    /// Parse a downloaded quote page body.
    pub fn parse(
        body: &str,
        symbol: &str,
        base: &Url,
        aliases: &AliasTable,
        now: NaiveDateTime,
    ) -> Self {
        let document = Html::parse_document(body);
        Self {
            symbol: symbol.to_uppercase(),
            news: extract_news(&document, symbol, base, aliases, now),
            snapshot: extract_snapshot(&document, symbol),
        }
    }

    /// Score the articles and summarize those inside the window.
    pub fn into_report(
        self,
        engine: &SentimentEngine,
        window_days: u32,
        now: NaiveDateTime,
    ) -> SymbolReport {
        let articles = engine.score_articles(self.news.articles);
        let summary = aggregate::summarize_window(&self.symbol, &articles, now, window_days);
        SymbolReport {
            symbol: self.symbol,
            generated_at: now,
            snapshot: self.snapshot,
            articles,
            summary,
            rows_seen: self.news.rows_seen,
            rows_skipped: self.news.rows_skipped,
            skip_reasons: self.news.skip_reasons,
            filtered_out: self.news.filtered_out,
        }
    }
}

/// Fetch and parse the quote page for `symbol`.
#[instrument(level = "info", skip(fetcher, base, aliases, now))]
pub async fn scrape_symbol<F: FetchPage>(
    fetcher: &F,
    base: &Url,
    symbol: &str,
    aliases: &AliasTable,
    now: NaiveDateTime,
) -> Result<QuotePage, Box<dyn Error>> {
    let url = quote_url(base, symbol)?;
    let body = fetcher.fetch(url.as_str()).await?;
    let page = QuotePage::parse(&body, symbol, base, aliases, now);
    info!(
        symbol = %page.symbol,
        table = page.news.table_strategy.unwrap_or("none"),
        rows = page.news.rows_seen,
        skipped = page.news.rows_skipped,
        filtered_out = page.news.filtered_out,
        articles = page.news.articles.len(),
        has_snapshot = page.snapshot.is_some(),
        "Scraped quote page"
    );
    Ok(page)
}
