//! Resilient extraction of news rows and quote fields from a parsed page.
//!
//! Every function here is a synchronous transformation over a
//! [`scraper::Html`] document. Nothing in this module fails: missing tables
//! become `None`, bad rows become [`crate::models::RowOutcome::Skipped`],
//! and unparseable fields are left absent.
//!
//! # Pipeline
//!
//! ```text
//! Html ─ table::locate_news_table ─ rows ─ row::RowParser (+ datetime) ─ relevance::RelevanceFilter
//! Html ─ snapshot::locate_snapshot_table ─ snapshot::parse_snapshot_table
//! ```

pub mod datetime;
pub mod relevance;
pub mod row;
pub mod snapshot;
pub mod table;
