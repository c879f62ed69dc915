//! Safe access into loosely structured tracking JSON.
//!
//! Every nested field the report reads goes through these helpers. A path
//! that crosses a missing key, a non-object, or a JSON `null` resolves to
//! `None` instead of failing.

use serde_json::Value;

pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
        .filter(|found| !found.is_null())
}

/// Scalar text at `path`. Numbers and booleans are rendered to text; objects
/// and arrays are not scalars and resolve to `None`.
pub fn lookup_text(value: &Value, path: &[&str]) -> Option<String> {
    match lookup(value, path)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Array at `path`, or an empty slice when absent or not an array.
pub fn lookup_array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
