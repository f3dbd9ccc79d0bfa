//! Tolerant field extraction from untrusted provider JSON.
//!
//! Upstream schemas rename fields freely (`alt_baro` vs `altitude` vs
//! `alt`), mix numbers and numeric strings, and omit keys at will.
//! Each field is therefore read through an explicit ordered list of
//! candidate keys; the first key that is present with a non-null value
//! wins, and any value that cannot be coerced degrades to the default.

use serde_json::Value;

/// Coerce a JSON value to a trimmed string. Null becomes "".
pub fn coerce_str(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce a JSON value to f64. Accepts numbers and numeric strings.
pub fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to i32, truncating fractional parts.
pub fn coerce_i32(v: &Value) -> Option<i32> {
    coerce_f64(v).map(|f| f as i32)
}

fn first_present<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        match obj.get(key) {
            Some(Value::Null) | None => continue,
            Some(v) => return Some(v),
        }
    }
    None
}

/// First present key as a string, else "".
pub fn pick_str(obj: &Value, keys: &[&str]) -> String {
    first_present(obj, keys).map(coerce_str).unwrap_or_default()
}

/// First present key as f64, else 0.0.
pub fn pick_f64(obj: &Value, keys: &[&str]) -> f64 {
    first_present(obj, keys)
        .and_then(coerce_f64)
        .unwrap_or(0.0)
}

/// First present key as i32, else 0.
pub fn pick_i32(obj: &Value, keys: &[&str]) -> i32 {
    first_present(obj, keys).and_then(coerce_i32).unwrap_or(0)
}

/// First present key as bool. Accepts booleans and 0/1 numbers.
pub fn pick_bool(obj: &Value, keys: &[&str]) -> bool {
    match first_present(obj, keys) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) != 0.0,
        _ => false,
    }
}

/// Positional array element as f64, else 0.0 (state-vector payloads).
pub fn index_f64(arr: &[Value], idx: usize) -> f64 {
    arr.get(idx).and_then(coerce_f64).unwrap_or(0.0)
}

/// Positional array element as a string, else "".
pub fn index_str(arr: &[Value], idx: usize) -> String {
    arr.get(idx).map(coerce_str).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
