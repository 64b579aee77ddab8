//! String normalization and amount coercion shared by the loader and the engine.
//!
//! Neither function can fail: a malformed cell degrades to an empty string or
//! `0.0` so a single bad row never aborts a batch.

use crate::domain::Value;

/// Normalize a cell for comparison: trimmed and lower-cased, absent as `""`.
pub fn normalize(value: &Value) -> String {
    match value {
        Value::Text(s) => normalize_str(s),
        Value::Number(n) => n.to_string(),
        Value::Absent => String::new(),
    }
}

/// Normalize a raw string for comparison.
#[inline]
pub fn normalize_str(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Coerce a cell to a monetary amount.
///
/// Numbers pass through. Text is read as Brazilian formatting first
/// (`.` thousands, `,` decimal: `"1.234,56"` is 1234.56), then as a plain
/// float. Anything unparseable, including `nan`/`inf`, is `0.0`.
pub fn parse_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) if n.is_finite() => *n,
        Value::Number(_) => 0.0,
        Value::Text(s) => parse_amount_str(s),
        Value::Absent => 0.0,
    }
}

/// Text form of [`parse_amount`].
pub fn parse_amount_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let localized = trimmed.replace('.', "").replace(',', ".");

    parse_finite(&localized)
        .or_else(|| parse_finite(trimmed))
        .unwrap_or(0.0)
}

#[inline]
fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
