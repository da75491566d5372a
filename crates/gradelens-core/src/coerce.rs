//! Lenient extraction of typed values from loosely-shaped JSON.
//!
//! The results store has changed shape over time and old rows are never
//! migrated, so every field read goes through these helpers: a value of the
//! wrong type resolves to `None` (or an empty list) instead of an error.

use serde_json::Value;

/// Read a finite number. Numeric strings such as `"72.5"` are accepted.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read an integer id. Whole floats (`3.0`) and digit strings are accepted.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a non-empty string. Numbers and booleans are stringified.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a list of strings from either a JSON array or a comma-joined string.
///
/// Blank entries are dropped.
pub fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
