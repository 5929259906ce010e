//! Text normalization applied before any estimator runs.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid markup regex"));
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,!?;:\-]").expect("valid character regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Strip markup tags and URLs, drop characters outside word characters,
/// whitespace and `. , ! ? ; : -`, then collapse whitespace and trim.
pub fn clean_text(text: &str) -> String {
    let text = MARKUP.replace_all(text, " ");
    let text = URL.replace_all(&text, " ");
    let text = DISALLOWED.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
