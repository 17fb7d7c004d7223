//! Flexible date parsing shared by import and time-aligned correlation
//!
//! Personal records carry dates in whatever shape the upload had: ISO dates,
//! US-style slashes, RFC 3339 timestamps, or journal prefixes like
//! "July 2nd". Parsing is best-effort; anything unrecognized is `None`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(?:st|nd|rd|th)\b").expect("valid regex"));

/// Parse a date from any supported format. Year-less forms ("July 2nd")
/// resolve against the current year.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_date_with_year(s, Utc::now().year())
}

/// Parse a date, resolving year-less forms against `default_year`
pub fn parse_date_with_year(s: &str, default_year: i32) -> Option<NaiveDate> {
    let cleaned = strip_ordinal_suffixes(s.trim());
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date);
        }
    }

    for format in ["%B %d, %Y", "%B %d %Y", "%b %d, %Y", "%b %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date);
        }
    }

    // Month-and-day only: inject the default year
    let with_year = format!("{} {}", default_year, cleaned);
    for format in ["%Y %B %d", "%Y %b %d"] {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, format) {
            return Some(date);
        }
    }

    None
}

/// Pull a date out of a journal entry's leading prefix, e.g.
/// `"July 2nd - 2 goals"` or `"2024-07-02: morning run"`.
pub fn leading_entry_date(text: &str) -> Option<NaiveDate> {
    let head = text
        .split_once(" - ")
        .or_else(|| text.split_once(": "))
        .map(|(head, _)| head)
        .unwrap_or(text)
        .trim();

    if let Some(date) = parse_date(head) {
        return Some(date);
    }

    // Fall back to shrinking token prefixes ("July 2nd, 2024 heavy rain")
    let tokens: Vec<&str> = head.split_whitespace().collect();
    (1..=tokens.len().min(3))
        .rev()
        .find_map(|n| parse_date(&tokens[..n].join(" ")))
}

/// "July 2nd" → "July 2"
fn strip_ordinal_suffixes(s: &str) -> String {
    ORDINAL_SUFFIX.replace_all(s, "$1").into_owned()
}
