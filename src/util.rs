// Utility helpers for parsing, rounding and number formatting.
//
// This module centralizes the "dirty" CSV number/date handling so the
// aggregator can assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Strips a leading `$` and thousands separators like `","`.
/// - Rejects values that contain alphabetic characters.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace([',', '$'], "");
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an event date, accepting ISO and US layouts with or without a
/// time-of-day. Only the calendar date is kept.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok().map(|dt| dt.date()))
        .or_else(|| DATE_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(s, f).ok()))
}

/// Round to two decimal places, ties to even (`0.125` -> `0.12`).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// `numerator / denominator` rounded to two places, or `None` when the
/// share is undefined (zero denominator or a missing numerator).
pub fn share(numerator: Option<f64>, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    numerator.map(|n| round2(n / denominator))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_money(v: Option<f64>) -> String {
    v.map(|n| format!("${}", format_number(n, 2))).unwrap_or_default()
}

pub fn format_percent(v: Option<f64>) -> String {
    v.map(|p| format!("{:.0}%", p * 100.0)).unwrap_or_default()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_currency_strings() {
        assert_eq!(parse_f64_safe(Some(" $1,234.50 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("2")), Some(2.0));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parses_common_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert_eq!(parse_date_safe(Some("2024-03-07")), expected);
        assert_eq!(parse_date_safe(Some("03/07/2024")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-07 11:30:00")), expected);
        assert_eq!(parse_date_safe(Some("3/7/2024 11:30:00 AM")), expected);
        assert_eq!(parse_date_safe(Some("not a date")), None);
        assert_eq!(parse_date_safe(Some("2024-13-40")), None);
    }

    #[test]
    fn rounds_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(0.999), 1.0);
        assert_eq!(share(Some(1.0), 8.0), Some(0.12));
    }

    #[test]
    fn share_is_undefined_for_zero_denominator() {
        assert_eq!(share(Some(15.0), 20.0), Some(0.75));
        assert_eq!(share(Some(15.0), 0.0), None);
        assert_eq!(share(None, 20.0), None);
    }

    #[test]
    fn formats_money_and_percent() {
        assert_eq!(format_money(Some(1234567.891)), "$1,234,567.89");
        assert_eq!(format_money(None), "");
        assert_eq!(format_percent(Some(0.42)), "42%");
        assert_eq!(format_percent(None), "");
        assert_eq!(format_number(-12.5, 2), "-12.50");
    }
}
