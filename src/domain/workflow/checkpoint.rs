use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;

use super::StepOutcome;

/// Durable record of a step that returned.
///
/// Once written, the step is never invoked again for the same run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub step: String,
    pub output: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    pub recorded_at: Timestamp,
}

impl Checkpoint {
    pub fn from_outcome(step: impl Into<String>, outcome: &StepOutcome) -> Self {
        Self {
            step: step.into(),
            output: outcome.value().clone(),
            degraded_reason: outcome.degraded_reason().map(str::to_string),
            recorded_at: Timestamp::now(),
        }
    }
}
