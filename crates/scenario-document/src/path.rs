//! Helpers for reading loosely-typed JSON trees
//!
//! Scenario documents are hand-written, so flags and titles show up as
//! booleans, numbers or strings interchangeably. These helpers coerce them
//! the same way everywhere.

use serde_json::{Map, Value};

/// Get value at path (dot notation)
#[must_use]
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Text of a scalar value
///
/// Strings are returned as-is, numbers and booleans are rendered. Null,
/// arrays and objects have no text.
#[must_use]
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text of `key` in `map`, see [`text`]
#[must_use]
pub fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(text)
}

/// Flag coercion: `true`, a non-zero number, or the strings `"true"`/`"1"`
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// True when `key` is present in `map` and truthy
#[must_use]
pub fn flag(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(is_truthy)
}
