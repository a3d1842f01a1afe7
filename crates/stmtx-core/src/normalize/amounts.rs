//! Amount cleanup for table cells and service payloads.

use serde_json::Value;

/// Parse a statement amount cell such as `"$1,234.56"` or `"(123.45)"`.
///
/// Currency symbols, thousands separators and spaces are dropped; an amount
/// wrapped in parentheses is negative (accounting notation). Returns `None`
/// when nothing numeric remains.
pub fn clean_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let cleaned = cleaned.trim();

    let signed = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => format!("-{inner}"),
        None => cleaned.to_string(),
    };

    signed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strict numeric coercion for values returned by the remote service.
///
/// Accepts JSON numbers, numeric strings and booleans. Everything else
/// (objects, arrays, `null`, free text) is rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}
