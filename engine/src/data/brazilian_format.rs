// Number and date handling for spreadsheet exports that mix Brazilian and
// international conventions from one batch to the next.
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

// Longest first so "R$" is removed before a bare "$".
const CURRENCY_MARKERS: [&str; 3] = ["US$", "R$", "$"];

const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y"];

// 9999-12-31 as an Excel serial day.
const EXCEL_MAX_SERIAL: u64 = 2_958_465;

/// Parses a locale-ambiguous numeric cell into a decimal.
///
/// Rules, applied in order after stripping currency markers and all
/// whitespace (non-breaking space included):
/// 1. both `,` and `.` present: `.` is a thousands separator, `,` the decimal point;
/// 2. only `,` present: `,` is the decimal point;
/// 3. more than one `.`: every `.` but the last is a thousands separator.
///
/// Empty input and a lone `-` are absent, not zero. Anything that still fails
/// to parse is absent as well; callers drop the owning row.
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let mut stripped = raw.to_string();
    for marker in CURRENCY_MARKERS {
        stripped = stripped.replace(marker, "");
    }
    let mut s: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

    let has_comma = s.contains(',');
    let has_dot = s.contains('.');
    if has_comma && has_dot {
        s = s.replace('.', "").replace(',', ".");
    } else if has_comma {
        s = s.replace(',', ".");
    } else if s.matches('.').count() > 1 {
        if let Some((head, tail)) = s.rsplit_once('.') {
            s = format!("{}.{}", head.replace('.', ""), tail);
        }
    }

    if s.is_empty() || s == "-" {
        return None;
    }

    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

/// Tolerant calendar-date parser. Time-of-day components are discarded.
///
/// Day-first is assumed for slash and dash separated dates, matching the
/// Brazilian exports this data comes from.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    parse_excel_serial(s)
}

// Spreadsheet cells exported without formatting carry the serial day number
// counted from 1899-12-30.
fn parse_excel_serial(s: &str) -> Option<NaiveDate> {
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s, "0"),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let days: u64 = whole.parse().ok()?;
    if days == 0 || days > EXCEL_MAX_SERIAL {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))
}
