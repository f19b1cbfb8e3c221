//! Forgiving field decoders for model- and caller-supplied JSON.
//!
//! Model output routinely gets types wrong (`"themes": "work"`, a string
//! where a list was asked for). These decoders never fail: a value of the
//! wrong shape decodes as the field's empty value.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

/// A string, or `""` for anything else.
pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => s,
        _ => String::new(),
    })
}

/// A non-empty string, or `None`.
pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// The string elements of an array; non-string elements are dropped.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// A JSON number, or `0`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(JsonValue::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

/// A JSON object, or an empty one.
pub(crate) fn object<'de, D>(deserializer: D) -> Result<Map<String, JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    })
}

/// An array, or an empty one.
pub(crate) fn list<'de, D>(deserializer: D) -> Result<Vec<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Array(items) => items,
        _ => Vec::new(),
    })
}

/// Any value except `null`.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => None,
        other => Some(other),
    })
}
