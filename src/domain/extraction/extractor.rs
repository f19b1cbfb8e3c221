//! Best-effort recovery of a JSON object from free-text model output.
//!
//! Models asked for "ONLY valid JSON" still wrap answers in markdown fences
//! or lead with prose. The extractor strips fences, prefers a JSON block that
//! runs to the end of the text, and falls back to an empty object instead of
//! failing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

/// Matches opening and closing fences, optionally labelled `json`.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?").expect("code fence pattern is valid"));

/// Longest model output the extractor will look at (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Most `{` positions tried as the start of the trailing object.
const MAX_CANDIDATES: usize = 64;

/// A JSON object recovered from model output.
pub type ExtractedObject = Map<String, JsonValue>;

/// Extracts a JSON object from raw model text.
///
/// Returns an empty object when `raw` is absent, blank, longer than
/// `MAX_RESPONSE_LENGTH`, or when no object can be parsed. Never panics and never returns an error; parse failures
/// are logged with the raw text and the cleaned candidate.
pub fn extract(raw: Option<&str>) -> ExtractedObject {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Map::new(),
    };

    if raw.len() > MAX_RESPONSE_LENGTH {
        tracing::warn!(
            length = raw.len(),
            max = MAX_RESPONSE_LENGTH,
            "Model output too long, returning empty object"
        );
        return Map::new();
    }

    let cleaned = strip_code_fences(raw);

    match parse_trailing_object(&cleaned) {
        Ok(object) => object,
        Err((candidate, error)) => {
            tracing::error!(
                raw = %raw,
                cleaned = %candidate,
                error = %error,
                "JSON parse failed, returning empty object"
            );
            Map::new()
        }
    }
}

/// Extracts and deserializes into `T`, using `T::default()` when the
/// recovered object is empty or does not fit `T`.
///
/// The flag is true when a non-empty object was recovered and decoded.
pub fn extract_as<T>(raw: Option<&str>) -> (T, bool)
where
    T: DeserializeOwned + Default,
{
    let object = extract(raw);
    if object.is_empty() {
        return (T::default(), false);
    }

    match serde_json::from_value(JsonValue::Object(object)) {
        Ok(value) => (value, true),
        Err(error) => {
            tracing::warn!(error = %error, "Extracted object did not match expected shape");
            (T::default(), false)
        }
    }
}

fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Parses the object that runs to the end of `cleaned`.
///
/// Candidates start at each `{` from left to right, so the widest block that
/// parses wins and a later self-contained block is used when leading text
/// contains stray braces. At most `MAX_CANDIDATES` starts are tried. Without
/// a trailing `}` the whole text is parsed.
fn parse_trailing_object(cleaned: &str) -> Result<ExtractedObject, (String, String)> {
    if cleaned.ends_with('}') {
        let mut first_failure: Option<(String, String)> = None;

        for (start, _) in cleaned.match_indices('{').take(MAX_CANDIDATES) {
            let candidate = &cleaned[start..];
            match parse_object(candidate) {
                Ok(object) => return Ok(object),
                Err(error) => {
                    if first_failure.is_none() {
                        first_failure = Some((candidate.to_string(), error));
                    }
                }
            }
        }

        if let Some(failure) = first_failure {
            return Err(failure);
        }
    }

    parse_object(cleaned).map_err(|error| (cleaned.to_string(), error))
}

fn parse_object(candidate: &str) -> Result<ExtractedObject, String> {
    match serde_json::from_str::<JsonValue>(candidate) {
        Ok(JsonValue::Object(object)) => Ok(object),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
