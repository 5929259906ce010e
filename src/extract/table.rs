//! Locating the news table inside a quote page.
//!
//! The page layout changes without notice, so the table is searched for
//! with an ordered chain of [`TableStrategy`] values. Each strategy is a
//! cheap, independent heuristic; the first one that yields a table wins.
//!
//! | Order | Strategy | Matches |
//! |-------|----------|---------|
//! | 1 | `class-signature` | `<table class="body-table-news-wrapper news-table_wrapper">` |
//! | 2 | `id` | `<table id="news-table">` |
//! | 3 | `class-pattern` | any table with a class containing "news" (any case) |
//! | 4 | `first-table` | the first table, only if it holds 3+ absolute links |

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Full class attribute of the news table in the current layout.
pub const NEWS_TABLE_CLASS_SIGNATURE: &str = "body-table-news-wrapper news-table_wrapper";
/// Identifier of the news table in the older layout.
pub const NEWS_TABLE_ID: &str = "news-table";
/// Absolute links the generic fallback table must contain.
pub const MIN_ABSOLUTE_LINKS: usize = 3;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("valid table selector"));
static NEWS_TABLE_BY_ID: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table#news-table").expect("valid news table selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid link selector"));
static NEWS_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)news").expect("valid news regex"));

/// One heuristic for finding the news table.
#[derive(Clone, Copy)]
pub struct TableStrategy {
    pub name: &'static str,
    pub locate: for<'a> fn(&'a Html) -> Option<ElementRef<'a>>,
}

impl std::fmt::Debug for TableStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStrategy").field("name", &self.name).finish()
    }
}

/// The default fallback chain, in the order it is tried.
pub const DEFAULT_STRATEGIES: [TableStrategy; 4] = [
    TableStrategy {
        name: "class-signature",
        locate: by_class_signature,
    },
    TableStrategy {
        name: "id",
        locate: by_id,
    },
    TableStrategy {
        name: "class-pattern",
        locate: by_class_pattern,
    },
    TableStrategy {
        name: "first-table",
        locate: first_table_with_links,
    },
];

/// A table found by the locator, with the strategy that found it.
#[derive(Debug, Clone, Copy)]
pub struct LocatedTable<'a> {
    pub element: ElementRef<'a>,
    pub strategy: &'static str,
}

/// Find the news table using [`DEFAULT_STRATEGIES`].
///
/// `None` means the page has no recognizable news table, which callers
/// treat as "zero articles", not as a failure.
#[instrument(level = "debug", skip(document))]
pub fn locate_news_table<'a>(document: &'a Html, symbol: &str) -> Option<LocatedTable<'a>> {
    locate_with(document, &DEFAULT_STRATEGIES)
}

/// Try `strategies` in order and return the first hit.
pub fn locate_with<'a>(document: &'a Html, strategies: &[TableStrategy]) -> Option<LocatedTable<'a>> {
    for strategy in strategies {
        if let Some(element) = (strategy.locate)(document) {
            debug!(strategy = strategy.name, "News table located");
            return Some(LocatedTable {
                element,
                strategy: strategy.name,
            });
        }
        debug!(strategy = strategy.name, "Strategy found no table");
    }
    None
}

fn by_class_signature(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&TABLE).find(|table| {
        table
            .value()
            .attr("class")
            .map(|class| class.split_whitespace().collect::<Vec<_>>().join(" "))
            .is_some_and(|class| class == NEWS_TABLE_CLASS_SIGNATURE)
    })
}

fn by_id(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&NEWS_TABLE_BY_ID).next()
}

fn by_class_pattern(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&TABLE)
        .find(|table| table.value().classes().any(|class| NEWS_CLASS.is_match(class)))
}

fn first_table_with_links(document: &Html) -> Option<ElementRef<'_>> {
    let table = document.select(&TABLE).next()?;
    let absolute_links = count_absolute_links(table);
    if absolute_links >= MIN_ABSOLUTE_LINKS {
        Some(table)
    } else {
        debug!(absolute_links, "First table rejected as layout table");
        None
    }
}

/// Links inside `element` whose `href` is an absolute http(s) URL.
pub fn count_absolute_links(element: ElementRef<'_>) -> usize {
    element
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.trim_start().starts_with("http"))
        .count()
}
