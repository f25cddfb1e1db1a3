// Cell parsers, small statistics and the report number formats.
//
// Parsers return `None` for anything they cannot read in full; the
// formatters never fail and print non-finite values as zero.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use std::collections::HashMap;
use std::hash::Hash;

/// Values that mean "no data" in the source export.
const MISSING_MARKERS: &[&str] = &["n/a", "na", "null", "none", "-"];

/// Fallback date layouts tried after ISO `YYYY-MM-DD`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d %b %Y", "%b %d, %Y", "%B %d, %Y"];

fn is_missing_marker(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|m| lower == *m)
}

/// Strip a case-insensitive currency code or peso sign from either end.
fn strip_currency(s: &str) -> &str {
    let mut s = s.trim();
    if let Some(rest) = s.strip_prefix('₱') {
        s = rest.trim_start();
    }
    if s.len() >= 3 && s.is_char_boundary(3) && s[..3].eq_ignore_ascii_case("php") {
        s = s[3..].trim_start();
    }
    let n = s.len();
    if n >= 3 && s.is_char_boundary(n - 3) && s[n - 3..].eq_ignore_ascii_case("php") {
        s = s[..n - 3].trim_end();
    }
    s
}

/// Read a money or coordinate cell as `f64`.
///
/// - `None` in, `None` out, so optional columns pass straight through.
/// - Trims whitespace and drops a `PHP`/`₱` prefix or suffix.
/// - Removes every `,` grouping separator.
/// - Treats empty strings and `N/A`-style markers as missing.
/// - Returns `None` for anything that is not fully numeric afterwards
///   (`"12abc"` is rejected, not read as `12`), and for NaN/infinity.
pub fn parse_number(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() || is_missing_marker(s) {
        return None;
    }
    let cleaned = strip_currency(s).replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

pub fn parse_year(s: Option<&str>) -> Option<i32> {
    s?.trim().parse::<i32>().ok()
}

/// Parse a calendar date, trying ISO first and then a few textual layouts.
/// Datetime values keep only their date part.
pub fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() || is_missing_marker(s) {
        return None;
    }
    let date_part = s.split(['T', ' ']).next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

/// Signed number of days from `start` to `end`.
pub fn days_diff(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Mean of `v`, 0 for an empty slice.
pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Middle value, or the mean of the two middle values. 0 when empty.
pub fn median(mut v: Vec<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

/// `part / total` as a percentage, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Group items by key, keeping groups in first-occurrence order.
pub fn group_by<'a, T, K, F>(items: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// `-0.00` and friends lose their sign.
fn drop_negative_zero(s: String) -> String {
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.' || c == ',') => rest.to_string(),
        _ => s,
    }
}

/// Insert the `en` locale's thousands separator into a plain digit string.
/// Works on the text, so magnitudes past `u128` are grouped too.
fn group_digits(digits: &str) -> String {
    let sep = Locale::en.separator();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

/// Fixed `decimals` places with grouped thousands, e.g. `1,234,567.89`.
/// Non-finite input prints as zero.
pub fn format_number(n: f64, decimals: usize) -> String {
    let n = finite_or_zero(n);
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut res = group_digits(int_part);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if n.is_sign_negative() {
        drop_negative_zero(format!("-{}", res))
    } else {
        res
    }
}

/// Whole-unit rendering for budget/cost totals, e.g. `4,500,000`.
pub fn format_large_number(n: f64) -> String {
    format_number(finite_or_zero(n).round(), 0)
}

/// Fixed two-decimal rendering without grouping, for ratios and indices.
pub fn format_ratio(n: f64) -> String {
    drop_negative_zero(format!("{:.2}", finite_or_zero(n)))
}

/// Grouped integer for console counts, e.g. `9,855`.
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
