//! Parsing the label/value quote snapshot table into a [`StockSnapshot`].
//!
//! Each row of the snapshot table holds several `label | value` cell pairs.
//! Labels are matched case-insensitively against [`LABEL_FIELDS`]; unknown
//! labels are ignored.

use crate::extract::row::cell_text;
use crate::models::StockSnapshot;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid row selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid cell selector"));
static SNAPSHOT_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.snapshot-table2").expect("valid snapshot selector"));

/// Snapshot field a label feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockField {
    Name,
    Price,
    Change,
    ChangePercent,
    Volume,
    AvgVolume,
    MarketCap,
    PeRatio,
    Eps,
    Dividend,
    DividendYield,
    Sector,
    Industry,
    Country,
    Exchange,
    IpoDate,
    High52w,
    Low52w,
    Rsi,
    Sma20,
    Sma50,
    Sma200,
}

/// Lower-cased label → field.
pub const LABEL_FIELDS: &[(&str, StockField)] = &[
    ("company", StockField::Name),
    ("price", StockField::Price),
    ("change", StockField::Change),
    ("change %", StockField::ChangePercent),
    ("volume", StockField::Volume),
    ("avg volume", StockField::AvgVolume),
    ("market cap", StockField::MarketCap),
    ("pe", StockField::PeRatio),
    ("p/e", StockField::PeRatio),
    ("eps (ttm)", StockField::Eps),
    ("dividend", StockField::Dividend),
    ("dividend %", StockField::DividendYield),
    ("sector", StockField::Sector),
    ("industry", StockField::Industry),
    ("country", StockField::Country),
    ("exchange", StockField::Exchange),
    ("ipo date", StockField::IpoDate),
    ("52w high", StockField::High52w),
    ("52w low", StockField::Low52w),
    ("rsi (14)", StockField::Rsi),
    ("sma20", StockField::Sma20),
    ("sma50", StockField::Sma50),
    ("sma200", StockField::Sma200),
];

/// Look up the field for a raw label.
pub fn field_for_label(label: &str) -> Option<StockField> {
    let label = label.trim().to_lowercase();
    LABEL_FIELDS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, field)| *field)
}

/// Find the snapshot table in a quote page.
pub fn locate_snapshot_table(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&SNAPSHOT_TABLE).next()
}

/// Parse a snapshot table for `symbol`.
///
/// # Returns
///
/// `None` when `table` is absent or carries no company name.
#[instrument(level = "debug", skip(table))]
pub fn parse_snapshot_table(table: Option<ElementRef<'_>>, symbol: &str) -> Option<StockSnapshot> {
    let table = table?;
    let mut snapshot = StockSnapshot::empty(symbol);
    let mut recognized = 0usize;

    for row in table.select(&ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        for pair in cells.chunks_exact(2) {
            let label = cell_text(pair[0]);
            let value = cell_text(pair[1]);
            if let Some(field) = field_for_label(&label) {
                apply_field(&mut snapshot, field, &value);
                recognized += 1;
            }
        }
    }

    if snapshot.change_percent.is_none() {
        snapshot.change_percent = derive_change_percent(snapshot.price, snapshot.change);
    }

    if snapshot.name.trim().is_empty() {
        debug!(recognized, "Snapshot table has no company name");
        return None;
    }
    debug!(recognized, name = %snapshot.name, "Parsed snapshot table");
    Some(snapshot)
}

fn apply_field(snapshot: &mut StockSnapshot, field: StockField, value: &str) {
    match field {
        StockField::Name => snapshot.name = value.to_string(),
        StockField::Price => snapshot.price = parse_float(value),
        StockField::Change => snapshot.change = parse_float(value),
        StockField::ChangePercent => snapshot.change_percent = parse_float(value),
        StockField::Volume => snapshot.volume = parse_int(value),
        StockField::AvgVolume => snapshot.avg_volume = parse_int(value),
        StockField::MarketCap => snapshot.market_cap = parse_text(value),
        StockField::PeRatio => snapshot.pe_ratio = parse_float(value),
        StockField::Eps => snapshot.eps = parse_float(value),
        StockField::Dividend => snapshot.dividend = parse_float(value),
        StockField::DividendYield => snapshot.dividend_yield = parse_float(value),
        StockField::Sector => snapshot.sector = parse_text(value),
        StockField::Industry => snapshot.industry = parse_text(value),
        StockField::Country => snapshot.country = parse_text(value),
        StockField::Exchange => snapshot.exchange = parse_text(value),
        StockField::IpoDate => snapshot.ipo_date = parse_date(value),
        StockField::High52w => snapshot.high_52w = parse_float(value),
        StockField::Low52w => snapshot.low_52w = parse_float(value),
        StockField::Rsi => snapshot.rsi = parse_float(value),
        StockField::Sma20 => snapshot.sma_20 = parse_float(value),
        StockField::Sma50 => snapshot.sma_50 = parse_float(value),
        StockField::Sma200 => snapshot.sma_200 = parse_float(value),
    }
}

/// `change / (price - change) * 100`, when both inputs exist and the base is nonzero.
pub fn derive_change_percent(price: Option<f64>, change: Option<f64>) -> Option<f64> {
    let (price, change) = (price?, change?);
    let base = price - change;
    if base == 0.0 {
        return None;
    }
    Some(change / base * 100.0)
}

/// Strip everything but digits, `.` and a leading `-`, then parse.
///
/// `"1.2B"` → `1.2`, `"52,310"` → `52310.0`, `"-"` and `""` → `None`.
pub fn parse_float(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        return None;
    }
    let mut cleaned = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_digit() || c == '.' || (c == '-' && cleaned.is_empty()) {
            cleaned.push(c);
        }
    }
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// [`parse_float`] truncated toward zero.
pub fn parse_int(value: &str) -> Option<i64> {
    parse_float(value).map(|v| v.trunc() as i64)
}

fn parse_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        None
    } else {
        Some(value.to_string())
    }
}

/// IPO dates appear as `12/12/1980`, `1980-12-12`, `12-12-1980` or `Dec 12, 1980`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        return None;
    }
    ["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y", "%b %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rows: &str) -> Option<StockSnapshot> {
        let html = format!(r#"<table class="snapshot-table2">{rows}</table>"#);
        let document = Html::parse_document(&html);
        parse_snapshot_table(locate_snapshot_table(&document), "aapl")
    }

    #[test]
    fn test_multiple_pairs_per_row() {
        let snapshot = parse(
            r#"<tr><td>Company</td><td>Apple Inc.</td><td>P/E</td><td>29.15</td></tr>
               <tr><td>Price</td><td>150.25</td><td>Volume</td><td>52,310,400</td>
                   <td>Market Cap</td><td>2.95T</td></tr>
               <tr><td>Sector</td><td>Technology</td><td>Dividend %</td><td>0.55%</td></tr>"#,
        )
        .unwrap();
        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.name, "Apple Inc.");
        assert_eq!(snapshot.pe_ratio, Some(29.15));
        assert_eq!(snapshot.price, Some(150.25));
        assert_eq!(snapshot.volume, Some(52_310_400));
        assert_eq!(snapshot.market_cap.as_deref(), Some("2.95T"));
        assert_eq!(snapshot.sector.as_deref(), Some("Technology"));
        assert_eq!(snapshot.dividend_yield, Some(0.55));
        assert_eq!(snapshot.currency, "USD");
    }

    #[test]
    fn test_change_percent_is_derived() {
        let snapshot = parse(
            r#"<tr><td>Company</td><td>Apple Inc.</td></tr>
               <tr><td>Price</td><td>150.25</td><td>Change</td><td>2.50</td></tr>"#,
        )
        .unwrap();
        let pct = snapshot.change_percent.unwrap();
        assert!((pct - 1.692).abs() < 0.001, "got {pct}");
    }

    #[test]
    fn test_supplied_change_percent_is_kept() {
        let snapshot = parse(
            r#"<tr><td>Company</td><td>Apple Inc.</td><td>Change %</td><td>3.10%</td></tr>
               <tr><td>Price</td><td>150.25</td><td>Change</td><td>2.50</td></tr>"#,
        )
        .unwrap();
        assert_eq!(snapshot.change_percent, Some(3.1));
    }

    #[test]
    fn test_missing_values_are_absent() {
        let snapshot = parse(
            r#"<tr><td>Company</td><td>Apple Inc.</td><td>Dividend</td><td>-</td></tr>
               <tr><td>EPS (ttm)</td><td></td><td>RSI (14)</td><td>61.20</td></tr>"#,
        )
        .unwrap();
        assert_eq!(snapshot.dividend, None);
        assert_eq!(snapshot.eps, None);
        assert_eq!(snapshot.rsi, Some(61.2));
        assert_eq!(snapshot.change_percent, None);
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let snapshot = parse(
            r#"<tr><td>Company</td><td>Apple Inc.</td><td>Shs Float</td><td>14.8B</td></tr>"#,
        )
        .unwrap();
        assert_eq!(snapshot.name, "Apple Inc.");
    }

    #[test]
    fn test_no_name_is_none() {
        assert!(parse(r#"<tr><td>Price</td><td>150.25</td></tr>"#).is_none());
    }

    #[test]
    fn test_absent_table_is_none() {
        let document = Html::parse_document("<html><body></body></html>");
        assert!(parse_snapshot_table(locate_snapshot_table(&document), "AAPL").is_none());
    }

    #[test]
    fn test_odd_trailing_cell_is_ignored() {
        let snapshot = parse(
            r#"<tr><td>Company</td><td>Apple Inc.</td><td>Price</td></tr>"#,
        )
        .unwrap();
        assert_eq!(snapshot.price, None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("1.2B"), Some(1.2));
        assert_eq!(parse_float("-0.50"), Some(-0.5));
        assert_eq!(parse_float("-3.41%"), Some(-3.41));
        assert_eq!(parse_float("1,234.5"), Some(1234.5));
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("N/A"), None);
        assert_eq!(parse_float("1.2.3"), None);
    }

    #[test]
    fn test_parse_int_truncates() {
        assert_eq!(parse_int("56.34M"), Some(56));
        assert_eq!(parse_int("52,310,400"), Some(52_310_400));
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1980, 12, 12);
        assert_eq!(parse_date("12/12/1980"), expected);
        assert_eq!(parse_date("1980-12-12"), expected);
        assert_eq!(parse_date("12-12-1980"), expected);
        assert_eq!(parse_date("Dec 12, 1980"), expected);
        assert_eq!(parse_date("-"), None);
    }

    #[test]
    fn test_derive_change_percent_zero_base() {
        assert_eq!(derive_change_percent(Some(2.0), Some(2.0)), None);
        assert_eq!(derive_change_percent(None, Some(2.0)), None);
        assert_eq!(derive_change_percent(Some(100.0), Some(0.0)), Some(0.0));
    }

    #[test]
    fn test_field_for_label_normalizes() {
        assert_eq!(field_for_label("  52W High "), Some(StockField::High52w));
        assert_eq!(field_for_label("Avg Volume"), Some(StockField::AvgVolume));
        assert_eq!(field_for_label("Beta"), None);
    }
}
