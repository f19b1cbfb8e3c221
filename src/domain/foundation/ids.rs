//! Workflow run identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::EventId;

/// Identifier of one workflow run.
///
/// Derived from the workflow id and the triggering event id, so a
/// re-delivered event maps onto the same run and its checkpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Builds the run id for `workflow_id` triggered by `event_id`.
    pub fn for_event(workflow_id: &str, event_id: &EventId) -> Self {
        Self(format!("{}:{}", workflow_id, event_id))
    }

    /// Creates a RunId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
