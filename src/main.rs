//! # Finviz Sentiment
//!
//! Batch runner: scrape each requested symbol's quote page, score its news,
//! and write one JSON report per symbol plus a run index.
//!
//! ## Usage
//!
//! ```sh
//! finviz_sentiment -j ./reports AAPL TSLA
//! finviz_sentiment -j ./reports --popular -c config.yaml
//! ```
//!
//! ## Architecture
//!
//! 1. **Setup**: tracing, CLI, config file, output directory probe
//! 2. **Scraping**: one symbol at a time with a polite delay, each fetch retried with backoff
//! 3. **Scoring**: the sentiment engine is built on first use and shared by every symbol
//! 4. **Output**: per-symbol reports, then `index.json` listing successes and failures

use chrono::Local;
use clap::Parser;
use finviz_sentiment::cli::Cli;
use finviz_sentiment::config::AppConfig;
use finviz_sentiment::fetch::{HttpFetcher, RetryFetch};
use finviz_sentiment::models::SymbolReport;
use finviz_sentiment::outputs::json::{self, RunIndex};
use finviz_sentiment::scrapers::finviz;
use finviz_sentiment::sentiment::EngineHandle;
use finviz_sentiment::utils::{collect_symbols, ensure_writable_dir};
use futures::stream::{self, StreamExt};
use std::error::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("finviz_sentiment starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration: file first, then flags ----
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path).await?,
        None => AppConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(days) = args.window_days {
        config.summary_window_days = days;
    }

    let mut extra: Vec<&str> = Vec::new();
    if args.popular {
        extra.extend(finviz::POPULAR_SYMBOLS);
    }
    for sector in &args.sector {
        let members = finviz::sector_symbols(sector);
        if members.is_empty() {
            warn!(%sector, "Unknown sector; ignoring");
        }
        extra.extend(members);
    }
    let symbols = collect_symbols(args.symbols.iter().map(String::as_str), extra);
    if symbols.is_empty() {
        error!("No symbols to process; pass symbols, --popular, or --sector");
        return Err("no symbols to process".into());
    }
    info!(count = symbols.len(), "Symbols queued");

    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let base = Url::parse(&config.base_url)?;
    let fetcher = RetryFetch::new(
        HttpFetcher::new(&config.user_agent)?,
        config.max_retries,
        config.retry_base_delay(),
    );
    let aliases = config.alias_table();
    let engine = EngineHandle::new(config.sentiment.clone());
    let now = Local::now().naive_local();
    let delay = config.request_delay();
    let window_days = config.summary_window_days;
    let output_dir = args.json_output_dir.as_str();

    // ---- Scrape and score, one symbol at a time ----
    let results: Vec<(String, Result<SymbolReport, Box<dyn Error>>)> = stream::iter(symbols.iter().enumerate())
        .then(|(i, symbol)| {
            let (fetcher, base, aliases, engine) = (&fetcher, &base, &aliases, &engine);
            async move {
                if i > 0 && !delay.is_zero() {
                    sleep(delay).await;
                }
                let result = async {
                    let page = finviz::scrape_symbol(fetcher, base, symbol, aliases, now).await?;
                    let report = page.into_report(engine.engine(), window_days, now);
                    json::write_report(&report, output_dir).await?;
                    Ok::<_, Box<dyn Error>>(report)
                }
                .await;
                (symbol.clone(), result)
            }
        })
        .collect()
        .await;

    // ---- Run index ----
    let mut index = RunIndex::new(now);
    for (symbol, result) in &results {
        match result {
            Ok(report) => {
                info!(
                    %symbol,
                    sentiment = %report.summary.overall_label,
                    score = report.summary.overall_score,
                    articles = report.summary.total_articles,
                    "Symbol processed"
                );
                index.record(report);
            }
            Err(e) => {
                error!(%symbol, error = %e, "Symbol failed; skipping");
                index.record_failure(symbol, e.as_ref());
            }
        }
    }
    if let Err(e) = json::write_index(&index, output_dir).await {
        error!(error = %e, "Failed to write run index");
    }

    info!(
        processed = index.processed.len(),
        failed = index.failed.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "finviz_sentiment finished"
    );
    Ok(())
}
