// Value normalization and formatting helpers.
//
// Spreadsheet exports carry Brazilian-formatted money ("R$ 1.234,56"),
// stray non-breaking spaces and free text in numeric cells. Everything that
// turns those cells into numbers lives here so the metric code can assume
// clean `f64`/`i64` values.
use num_format::{Locale, ToFormattedString};

/// Placeholder rendered wherever a metric is undefined.
pub const UNDEFINED: &str = "—";

/// Parse a locale-formatted currency string into a number.
///
/// - Trims whitespace and drops non-breaking spaces.
/// - Removes `.` thousands separators, then turns the `,` decimal separator
///   into `.`.
/// - Strips everything that is not a digit, a sign or a decimal point
///   (currency symbols, text).
/// - Returns `0.0` for blank or unparseable input; it never fails.
pub fn normalize_currency(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .replace('\u{a0}', "")
        .replace('.', "")
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse a night count. A comma decimal separator is accepted and the value
/// is truncated toward zero. Negative counts are passed through untouched.
pub fn normalize_count(raw: &str) -> i64 {
    let s = raw.trim().replace(',', ".");
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

/// Parse an identifier by keeping only its digits (`"#00123"` -> `123`).
pub fn normalize_id(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().unwrap_or(0)
}

/// Parse a plain, dot-decimal number (`"1234.5"`), coercing anything
/// unparseable to `0.0`.
pub fn parse_plain_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Trim a label and collapse internal runs of whitespace to one space.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Arithmetic mean of the defined values; `None` when nothing is defined.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators (e.g. `1,234,567.89`).
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

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn format_money(n: f64) -> String {
    format!("R$ {}", format_number(n, 2))
}

pub fn format_opt_money(n: Option<f64>) -> String {
    n.map(format_money).unwrap_or_else(|| UNDEFINED.to_string())
}

pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| UNDEFINED.to_string())
}

pub fn format_opt_pct(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format!("{}%", format_number(v, decimals)))
        .unwrap_or_else(|| UNDEFINED.to_string())
}
