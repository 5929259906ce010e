//! Parsing one news table row into an [`Article`].
//!
//! Rows look like `<tr><td>date</td><td>time</td><td><a href>title</a>
//! <span class="news-source">Publisher</span></td></tr>`, but the time cell
//! is often folded into the date cell, leaving only two cells.

use crate::extract::datetime;
use crate::models::{Article, RowOutcome, SkipReason};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use url::Url;

static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid cell selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid anchor selector"));
static SOURCE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.news-source").expect("valid source selector"));

/// Turns table rows into articles for one symbol.
#[derive(Debug, Clone)]
pub struct RowParser {
    symbol: String,
    base: Url,
    now: NaiveDateTime,
}

impl RowParser {
    /// # Arguments
    ///
    /// * `symbol` - Ticker the rows belong to (uppercased here)
    /// * `base` - Origin relative links are resolved against
    /// * `now` - Reference time for `Today`/`Yesterday` dates
    pub fn new(symbol: &str, base: Url, now: NaiveDateTime) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            base,
            now,
        }
    }

    /// Parse one `<tr>`.
    ///
    /// Needs at least two cells. The date comes from cell 0 and the time
    /// from cell 1; the title cell is cell 2 when there are three or more
    /// cells, otherwise cell 1.
    pub fn parse(&self, row: ElementRef<'_>) -> RowOutcome {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.len() < 2 {
            return RowOutcome::Skipped(SkipReason::TooFewCells { found: cells.len() });
        }

        let date_text = cell_text(cells[0]);
        let time_text = cell_text(cells[1]);
        let published_at = datetime::normalize_at(&date_text, &time_text, self.now);

        let title_cell = if cells.len() >= 3 { cells[2] } else { cells[1] };
        let Some(anchor) = title_cell.select(&ANCHOR).next() else {
            return RowOutcome::Skipped(SkipReason::MissingAnchor);
        };

        let href = anchor.value().attr("href").unwrap_or("").trim();
        if href.is_empty() {
            return RowOutcome::Skipped(SkipReason::EmptyLink);
        }
        let link = match resolve_link(&self.base, href) {
            Some(link) => link,
            None => {
                return RowOutcome::Skipped(SkipReason::UnresolvableLink {
                    href: href.to_string(),
                });
            }
        };

        let source = title_cell
            .select(&SOURCE)
            .next()
            .map(cell_text)
            .filter(|s| !s.is_empty());

        RowOutcome::Parsed(Article {
            symbol: self.symbol.clone(),
            title: cell_text(anchor),
            link,
            summary: None,
            source,
            published_at,
        })
    }
}

/// Absolute links pass through untouched; anything else is joined onto `base`.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(|url| url.to_string())
}

/// Visible text of an element with whitespace runs collapsed.
pub fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
