//! # Finviz Sentiment
//!
//! Turns Finviz quote pages into normalized news articles and stock
//! snapshots, then scores each headline with three independent sentiment
//! estimators fused into one label, score and confidence.
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`fetch`]): download `quote.ashx?t=SYMBOL` with retries
//! 2. **Extraction** ([`extract`], [`scrapers`]): locate the news table, parse
//!    rows, normalize dates, dedupe, filter for relevance; parse the snapshot table
//! 3. **Scoring** ([`sentiment`]): clean text, run the estimators, fuse, summarize
//! 4. **Output** ([`outputs`]): one JSON report per symbol plus a run index

pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod sentiment;
pub mod utils;
