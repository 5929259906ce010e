//! Deduplication and relevance filtering of parsed articles.
//!
//! A quote page's news table routinely carries syndicated stories about
//! other companies. An article is kept only when its headline names the
//! ticker or one of the company's known aliases as a whole word.

use crate::models::Article;
use itertools::Itertools;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Built-in ticker → company-name aliases, uppercase.
pub const COMPANY_ALIASES: &[(&str, &[&str])] = &[
    ("AAPL", &["APPLE"]),
    ("MSFT", &["MICROSOFT"]),
    ("GOOGL", &["GOOGLE", "ALPHABET"]),
    ("AMZN", &["AMAZON"]),
    ("TSLA", &["TESLA"]),
    ("META", &["FACEBOOK", "META"]),
    ("NVDA", &["NVIDIA"]),
    ("NFLX", &["NETFLIX"]),
    ("AMD", &["ADVANCED MICRO DEVICES"]),
    ("INTC", &["INTEL"]),
    ("CRM", &["SALESFORCE"]),
    ("ORCL", &["ORACLE"]),
    ("ADBE", &["ADOBE"]),
    ("PYPL", &["PAYPAL"]),
    ("UBER", &["UBER"]),
    ("LYFT", &["LYFT"]),
    ("SQ", &["SQUARE", "BLOCK"]),
    ("ROKU", &["ROKU"]),
    ("ZM", &["ZOOM"]),
    ("DOCU", &["DOCUSIGN"]),
    ("SNOW", &["SNOWFLAKE"]),
    ("PLTR", &["PALANTIR"]),
    ("COIN", &["COINBASE"]),
    ("HOOD", &["ROBINHOOD"]),
    ("SPOT", &["SPOTIFY"]),
    ("TWTR", &["TWITTER"]),
    ("SNAP", &["SNAPCHAT"]),
    ("PINS", &["PINTEREST"]),
    ("SHOP", &["SHOPIFY"]),
    ("ABNB", &["AIRBNB"]),
    ("DDOG", &["DATADOG"]),
    ("NET", &["CLOUDFLARE"]),
    ("OKTA", &["OKTA"]),
    ("CRWD", &["CROWDSTRIKE"]),
    ("ZS", &["ZSCALER"]),
    ("PANW", &["PALO ALTO"]),
    ("FTNT", &["FORTINET"]),
    ("CHKP", &["CHECK POINT"]),
    ("CYBR", &["CYBERARK"]),
    ("SAIL", &["SAILPOINT"]),
    ("ESTC", &["ELASTIC"]),
    ("MDB", &["MONGODB"]),
    ("DIS", &["DISNEY"]),
    ("NKE", &["NIKE"]),
    ("SBUX", &["STARBUCKS"]),
    ("MCD", &["MCDONALDS"]),
    ("KO", &["COCA COLA"]),
    ("PEP", &["PEPSICO"]),
    ("WMT", &["WALMART"]),
    ("TGT", &["TARGET"]),
    ("HD", &["HOME DEPOT"]),
    ("LOW", &["LOWES"]),
    ("COST", &["COSTCO"]),
    ("AMAT", &["APPLIED MATERIALS"]),
    ("LRCX", &["LAM RESEARCH"]),
    ("KLAC", &["KLA"]),
    ("MU", &["MICRON"]),
    ("QCOM", &["QUALCOMM"]),
    ("AVGO", &["BROADCOM"]),
    ("TXN", &["TEXAS INSTRUMENTS"]),
    ("ADI", &["ANALOG DEVICES"]),
    ("MRVL", &["MARVELL"]),
    ("SWKS", &["SKYWORKS"]),
    ("QRVO", &["QORVO"]),
    ("CRUS", &["CIRRUS LOGIC"]),
    ("SLAB", &["SILICON LABS"]),
    ("MCHP", &["MICROCHIP"]),
    ("ON", &["ON SEMICONDUCTOR"]),
    ("MPWR", &["MONOLITHIC POWER"]),
    ("POWI", &["POWER INTEGRATIONS"]),
    ("DIOD", &["DIODES"]),
    ("ALGM", &["ALLEGRO"]),
    ("IMOS", &["CHIPMOS"]),
    ("UMC", &["UNITED MICROELECTRONICS"]),
    ("TSM", &["TAIWAN SEMICONDUCTOR"]),
    ("ASML", &["ASML"]),
    ("NXPI", &["NXP"]),
    ("STM", &["ST MICROELECTRONICS"]),
    ("INFN", &["INFINERA"]),
    ("LITE", &["LUMENTUM"]),
    ("ACIA", &["ACACIA"]),
    ("COHR", &["COHERENT"]),
    ("IIVI", &["II VI"]),
    ("NPTN", &["NEOPHOTONICS"]),
    ("AAOI", &["APPLIED OPTOELECTRONICS"]),
    ("OCCL", &["OPTICAL CABLE"]),
    ("EMAN", &["EMANATION"]),
    ("FNSR", &["FINISAR"]),
    ("OCLR", &["OCLARO"]),
    ("PXLW", &["PIXELWORKS"]),
    ("RPXC", &["RPX"]),
    ("SMTC", &["SEMTECH"]),
    ("SITM", &["SITIME"]),
    ("SYNA", &["SYNAPTICS"]),
    ("XLNX", &["XILINX"]),
];

/// Separators that start trailing attribution in a title.
const HEADLINE_SEPARATORS: [&str; 4] = [" - ", " | ", " :: ", " ... "];
/// Openers that start a trailing ticker annotation.
const HEADLINE_OPENERS: [&str; 3] = [" (", " [", " {"];

/// Symbol → alias lookup, the built-in table plus configured extras.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        let aliases = COMPANY_ALIASES
            .iter()
            .map(|(symbol, names)| {
                (
                    symbol.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect();
        Self { aliases }
    }

    /// Add aliases for `symbol`, keeping existing ones. Everything is uppercased.
    pub fn extend<I, S>(&mut self, symbol: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.aliases.entry(symbol.to_uppercase()).or_default();
        for name in names {
            let name = name.as_ref().trim().to_uppercase();
            if !name.is_empty() && !entry.contains(&name) {
                entry.push(name);
            }
        }
    }

    /// Company-name aliases for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Ticker in any case
    ///
    /// # Returns
    ///
    /// The aliases registered for the uppercased symbol, or an empty slice.
    pub fn get(&self, symbol: &str) -> &[String] {
        self.aliases
            .get(&symbol.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ticker first, then its aliases.
    pub fn search_terms(&self, symbol: &str) -> Vec<String> {
        let symbol = symbol.to_uppercase();
        let mut terms = vec![symbol.clone()];
        terms.extend(self.get(&symbol).iter().filter(|a| **a != symbol).cloned());
        terms
    }
}

/// Cut a title down to its headline.
///
/// Truncates at the first of ` - `, ` | `, ` :: `, ` ... ` and then at the
/// first of ` (`, ` [`, ` {`, so `"Apple rallies (AAPL) - Reuters"` becomes
/// `"Apple rallies"`.
pub fn extract_headline(title: &str) -> &str {
    let mut headline = title;
    for separator in HEADLINE_SEPARATORS.iter().chain(HEADLINE_OPENERS.iter()) {
        if let Some((head, _)) = headline.split_once(separator) {
            headline = head;
        }
    }
    headline
}

/// Whole-word matcher for one symbol's search terms.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    symbol: String,
    patterns: Vec<Regex>,
}

impl RelevanceFilter {
    /// Build a filter matching `symbol` and its aliases as whole words.
    pub fn new(symbol: &str, aliases: &AliasTable) -> Self {
        let patterns = aliases
            .search_terms(symbol)
            .iter()
            .filter_map(|term| Regex::new(&format!(r"\b{}\b", regex::escape(term))).ok())
            .collect();
        Self {
            symbol: symbol.to_uppercase(),
            patterns,
        }
    }

    /// Whether the headline part of `title` names the symbol or an alias.
    pub fn is_relevant(&self, title: &str) -> bool {
        let headline = extract_headline(title).to_uppercase();
        self.patterns.iter().any(|pattern| pattern.is_match(&headline))
    }

    /// Drop repeated links (first occurrence wins), then unrelated articles.
    ///
    /// Order of the surviving articles is preserved.
    #[instrument(level = "debug", skip_all, fields(symbol = %self.symbol, candidates = articles.len()))]
    pub fn apply(&self, articles: Vec<Article>) -> Vec<Article> {
        let candidates = articles.len();
        let unique: Vec<Article> = articles
            .into_iter()
            .unique_by(|article| article.link.clone())
            .collect();
        let duplicates = candidates - unique.len();

        let kept: Vec<Article> = unique
            .into_iter()
            .filter(|article| {
                let relevant = self.is_relevant(&article.title);
                if !relevant {
                    debug!(title = %article.title, "Dropping unrelated article");
                }
                relevant
            })
            .collect();

        debug!(duplicates, kept = kept.len(), "Filtered articles");
        kept
    }
}
