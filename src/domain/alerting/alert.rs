use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;

/// What kind of condition raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// A chat message analysed above the risk threshold.
    Risk,
    /// A session analysis reported areas of concern.
    Concern,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::Risk => write!(f, "risk"),
            AlertKind::Concern => write!(f, "concern"),
        }
    }
}

/// A fire-and-forget observation. Attempted once, never part of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    /// Workflow that raised the alert.
    pub workflow: String,
    pub payload: JsonValue,
    pub raised_at: Timestamp,
}

impl AlertEvent {
    pub fn new(kind: AlertKind, workflow: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            kind,
            workflow: workflow.into(),
            payload,
            raised_at: Timestamp::now(),
        }
    }
}
