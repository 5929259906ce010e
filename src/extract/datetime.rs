//! Date and time reconciliation for news table cells.
//!
//! The news table shows dates in several shapes depending on how old the
//! story is: `Today`, `Yesterday`, `10-14`, `Oct-14-25` or `10-14-25`.
//! Times are either `09:30AM` style or 24-hour `14:30`. All parsing is done
//! relative to an injected `now` so results are reproducible in tests.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})$").expect("valid month-day regex"));
static TWELVE_HOUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})\s*([AaPp][Mm])$").expect("valid 12-hour regex")
});
static TWENTY_FOUR_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid 24-hour regex"));

/// Parse a date cell and a time cell into one timestamp.
///
/// The date is resolved in order: `today`, `yesterday`, `M-D` in the
/// current year, `Mon-DD-YY`, `MM-DD-YY`, and finally the current date.
/// When `time_text` does not parse, a time embedded after the date in
/// `date_text` (as in `"Oct-14-25 08:00PM"`) is tried before falling back
/// to midnight.
///
/// # Returns
///
/// `None` only when the text has the `M-D` shape but names a day that does
/// not exist (e.g. `2-30`).
pub fn normalize_at(date_text: &str, time_text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let date_text = date_text.trim();
    let time_text = time_text.trim();

    let (date_part, embedded_time) = split_embedded_time(date_text);
    let date = parse_date(date_part, now.date())?;

    let time = parse_time(time_text).or_else(|| embedded_time.and_then(parse_time));
    let timestamp = match time {
        Some(time) => date.and_time(time),
        None => date.and_time(NaiveTime::MIN),
    };
    debug!(date_text, time_text, %timestamp, "Normalized news timestamp");
    Some(timestamp)
}

/// Resolve the date portion of a cell against `today`.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.to_lowercase();
    if lower.contains("today") {
        return Some(today);
    }
    if lower.contains("yesterday") {
        return Some(today - Duration::days(1));
    }
    if let Some(caps) = MONTH_DAY.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(today.year(), month, day);
    }
    NaiveDate::parse_from_str(text, "%b-%d-%y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m-%d-%y"))
        .ok()
        .or(Some(today))
}

/// Parse `HH:MMam`/`HH:MMpm`, then `HH:MM`. Empty or unrecognized text is `None`.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = TWELVE_HOUR.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("pm");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    if let Some(caps) = TWENTY_FOUR_HOUR.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    None
}

/// Split `"Oct-14-25 08:00PM"` into `("Oct-14-25", Some("08:00PM"))`.
fn split_embedded_time(text: &str) -> (&str, Option<&str>) {
    match text.rsplit_once(char::is_whitespace) {
        Some((head, tail)) if parse_time(tail).is_some() => (head.trim_end(), Some(tail)),
        _ => (text, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 16)
            .unwrap()
            .and_hms_opt(11, 5, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_today_with_twelve_hour_time() {
        assert_eq!(normalize_at("Today", "2:30pm", now()), Some(at(2025, 10, 16, 14, 30)));
    }

    #[test]
    fn test_today_without_time_is_midnight() {
        assert_eq!(normalize_at("Today", "", now()), Some(at(2025, 10, 16, 0, 0)));
    }

    #[test]
    fn test_yesterday() {
        assert_eq!(
            normalize_at("Yesterday", "09:15AM", now()),
            Some(at(2025, 10, 15, 9, 15))
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(normalize_at("TODAY", "", now()), Some(at(2025, 10, 16, 0, 0)));
        assert_eq!(normalize_at("yesterday", "", now()), Some(at(2025, 10, 15, 0, 0)));
    }

    #[test]
    fn test_month_day_uses_current_year() {
        assert_eq!(normalize_at("3-7", "16:45", now()), Some(at(2025, 3, 7, 16, 45)));
    }

    #[test]
    fn test_month_day_out_of_range_is_unparseable() {
        assert_eq!(normalize_at("2-30", "", now()), None);
    }

    #[test]
    fn test_abbreviated_month_format() {
        assert_eq!(
            normalize_at("Oct-14-25", "08:00PM", now()),
            Some(at(2025, 10, 14, 20, 0))
        );
    }

    #[test]
    fn test_numeric_month_day_year_format() {
        assert_eq!(normalize_at("09-30-24", "", now()), Some(at(2024, 9, 30, 0, 0)));
    }

    #[test]
    fn test_unrecognized_date_falls_back_to_today() {
        assert_eq!(normalize_at("sometime", "10:00", now()), Some(at(2025, 10, 16, 10, 0)));
    }

    #[test]
    fn test_unparseable_time_is_midnight() {
        assert_eq!(normalize_at("Today", "soon", now()), Some(at(2025, 10, 16, 0, 0)));
    }

    #[test]
    fn test_embedded_time_in_date_cell() {
        assert_eq!(
            normalize_at("Oct-14-25 08:00PM", "", now()),
            Some(at(2025, 10, 14, 20, 0))
        );
        assert_eq!(
            normalize_at("Today 09:30AM", "Some headline text", now()),
            Some(at(2025, 10, 16, 9, 30))
        );
    }

    #[test]
    fn test_explicit_time_wins_over_embedded() {
        assert_eq!(
            normalize_at("Today 09:30AM", "1:00pm", now()),
            Some(at(2025, 10, 16, 13, 0))
        );
    }

    #[test]
    fn test_parse_time_twelve_hour_edges() {
        assert_eq!(parse_time("12:15am"), NaiveTime::from_hms_opt(0, 15, 0));
        assert_eq!(parse_time("12:15PM"), NaiveTime::from_hms_opt(12, 15, 0));
        assert_eq!(parse_time("13:00pm"), None);
        assert_eq!(parse_time("0:30am"), None);
    }

    #[test]
    fn test_parse_time_twenty_four_hour() {
        assert_eq!(parse_time("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_time("24:00"), None);
        assert_eq!(parse_time(""), None);
    }
}
