//! Lenient text coercions shared by the importers and the ingestion boundary.
//!
//! Exports from the legacy MS Access database and the sales spreadsheet are
//! loosely typed: currency carries `$` and thousands separators, missing
//! values appear as `None`, and dates use `M/D/YYYY`. Nothing here fails;
//! unusable input becomes `None` or zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// `true` for values the exports use to mean "no value".
pub fn is_blank(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "None"
}

/// Leading integer of `input`, ignoring leading whitespace and any trailing
/// garbage (`"2025 0:00:00"` parses as `2025`).
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].trim_start_matches('+').parse().ok()
}

/// Leading decimal number of `input` (`"12.50abc"` → `12.50`).
pub fn parse_float_lenient(input: &str) -> Option<Decimal> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_part = &s[int_start..end];

    let mut frac_part = "";
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_part = &s[frac_start..frac_end];
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut text = String::with_capacity(int_part.len() + frac_part.len() + 3);
    if negative {
        text.push('-');
    }
    text.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        text.push('.');
        text.push_str(frac_part);
    }
    Decimal::from_str(&text).ok()
}

/// Currency text to dollars: strips `$`, `,` and whitespace; anything
/// unparseable is zero.
pub fn parse_currency(input: &str) -> Decimal {
    if is_blank(input) {
        return Decimal::ZERO;
    }
    let cleaned: String = input
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    parse_float_lenient(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Parse `M/D/YYYY` or `M/D/YY` (the Access export format), RFC 3339, or ISO dates.
/// Calendar dates resolve to midnight UTC.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if is_blank(s) {
        return None;
    }

    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() == 3 {
        if let Some(date) = month_day_year(parts[0], parts[1], parts[2]) {
            return midnight_utc(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return midnight_utc(date);
    }

    None
}

fn month_day_year(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let month = u32::try_from(parse_int_prefix(month)?).ok()?;
    let day = u32::try_from(parse_int_prefix(day)?).ok()?;
    let year = i32::try_from(parse_int_prefix(year)?).ok()?;
    // Two-digit years are 19xx. Out-of-range months or days do not roll over.
    let year = if (0..100).contains(&year) { 1900 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}
