//! Header identity formatting: medical record number grouping and
//! day-first date rendering.
//!
//! Both functions are total: unparsable input degrades to a best-effort
//! rearrangement or is passed through untouched, never an error.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;

use super::rules::compile;

/// Whole-string formats tried in order. Slash and dot forms are day-first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d", "%Y.%m.%d"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A numeric date anywhere in the text, year-first or year-last.
static EMBEDDED_NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})|(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}))\b")
});

/// "4 September 2004", "04 Agu 2004" anywhere in the text.
static EMBEDDED_TEXTUAL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(\d{1,2})\s+([A-Za-z]{3,9})\.?\s+(\d{4})\b"));

static FALLBACK_DMY: LazyLock<Regex> = LazyLock::new(|| compile(r"(\d{2})[-/.](\d{2})[-/.](\d{4})"));
static FALLBACK_YMD: LazyLock<Regex> = LazyLock::new(|| compile(r"(\d{4})[-/.](\d{2})[-/.](\d{2})"));

/// Group the digits of a medical record number with dots.
///
/// 6 digits → `NN.NN.NN`, 7 digits → `N.NN.NN.NN`, anything else is split
/// into pairs from the left (the last chunk may be a single digit).
pub fn format_record_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }

    let widths: Vec<usize> = match digits.len() {
        6 => vec![2, 2, 2],
        7 => vec![1, 2, 2, 2],
        n => std::iter::repeat(2).take(n.div_ceil(2)).collect(),
    };

    let mut parts = Vec::with_capacity(widths.len());
    let mut start = 0;
    for width in widths {
        let end = (start + width).min(digits.len());
        parts.push(&digits[start..end]);
        start = end;
    }
    parts.join(".")
}

/// Render a loosely formatted date as `DD/MM/YYYY`.
///
/// Falls back to rearranging a raw `DD-MM-YYYY` / `YYYY-MM-DD` pattern
/// without validating it, and finally returns the input unchanged.
pub fn format_date_dmy(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(date) = parse_flexible_date(trimmed) {
        return date.format("%d/%m/%Y").to_string();
    }

    if let Some(caps) = FALLBACK_DMY.captures(trimmed) {
        return format!("{}/{}/{}", &caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = FALLBACK_YMD.captures(trimmed) {
        return format!("{}/{}/{}", &caps[3], &caps[2], &caps[1]);
    }

    tracing::debug!(len = trimmed.len(), "Date left as-is: no recognizable pattern");
    raw.to_string()
}

/// Parse a date from whole-string formats, textual month names, or a
/// date embedded in surrounding text ("PAREPARE 2004-09-04").
pub fn parse_flexible_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    for caps in EMBEDDED_NUMERIC.captures_iter(trimmed) {
        let parsed = if let (Some(y), Some(m), Some(d)) = (caps.get(1), caps.get(2), caps.get(3)) {
            ymd(y.as_str(), m.as_str(), d.as_str())
        } else if let (Some(d), Some(m), Some(y)) = (caps.get(4), caps.get(5), caps.get(6)) {
            ymd(y.as_str(), m.as_str(), d.as_str())
        } else {
            None
        };
        if parsed.is_some() {
            return parsed;
        }
    }

    for caps in EMBEDDED_TEXTUAL.captures_iter(trimmed) {
        let Some(month) = month_from_name(&caps[2]) else {
            continue;
        };
        let day: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(d);
        }
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Indonesian and English month names, full or abbreviated.
fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "januari" | "january" | "jan" => 1,
        "februari" | "pebruari" | "february" | "feb" | "peb" => 2,
        "maret" | "march" | "mar" => 3,
        "april" | "apr" => 4,
        "mei" | "may" => 5,
        "juni" | "june" | "jun" => 6,
        "juli" | "july" | "jul" => 7,
        "agustus" | "august" | "agu" | "agt" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "oktober" | "october" | "okt" | "oct" => 10,
        "november" | "nov" | "nop" => 11,
        "desember" | "december" | "des" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Indonesian weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

/// "Kamis, 22/10/2026"
pub fn format_day_label(date: NaiveDate) -> String {
    format!("{}, {}", weekday_name(date.weekday()), date.format("%d/%m/%Y"))
}
