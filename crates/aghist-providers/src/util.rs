use serde_json::Value;

/// Truthiness in the sense the vendor stores rely on: null, false, zero,
/// and empty strings/arrays/objects all count as absent.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Final path component, accepting either separator since the stores mix
/// POSIX and Windows paths.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// String form of a JSON value: strings verbatim, everything else as its
/// JSON rendering.
pub(crate) fn coerce_string(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}
