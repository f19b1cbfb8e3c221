use serde::Serialize;
use serde_json::Value as JsonValue;

/// What a step produced.
///
/// `Degraded` carries a usable fallback value plus the reason the real value
/// could not be produced. Both variants let the run continue.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Completed(JsonValue),
    Degraded { value: JsonValue, reason: String },
}

impl StepOutcome {
    /// Encodes `value` as a completed outcome.
    ///
    /// Encoding failure degrades to `null` with the encoder error as reason.
    pub fn completed<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => StepOutcome::Completed(value),
            Err(e) => StepOutcome::Degraded {
                value: JsonValue::Null,
                reason: format!("failed to encode step output: {}", e),
            },
        }
    }

    /// Encodes `value` as a fallback produced because of `reason`.
    pub fn degraded<T: Serialize>(value: &T, reason: impl Into<String>) -> Self {
        StepOutcome::Degraded {
            value: serde_json::to_value(value).unwrap_or(JsonValue::Null),
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &JsonValue {
        match self {
            StepOutcome::Completed(value) => value,
            StepOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> JsonValue {
        match self {
            StepOutcome::Completed(value) => value,
            StepOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            StepOutcome::Completed(_) => None,
            StepOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StepOutcome::Degraded { .. })
    }
}
