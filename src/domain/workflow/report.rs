use serde::Serialize;

use crate::domain::foundation::RunId;

/// How a step's output was obtained in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Degraded { reason: String },
    /// Loaded from a checkpoint written by an earlier delivery.
    Replayed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub name: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Audit trail of one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub workflow_id: String,
    pub run_id: RunId,
    pub steps: Vec<StepRecord>,
    /// Set when the workflow's run-level recovery produced the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_from: Option<String>,
}

impl RunReport {
    pub fn new(workflow_id: impl Into<String>, run_id: RunId) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id,
            steps: Vec::new(),
            recovered_from: None,
        }
    }

    pub fn push(&mut self, name: impl Into<String>, status: StepStatus) {
        self.steps.push(StepRecord {
            name: name.into(),
            status,
        });
    }

    pub fn status_of(&self, name: &str) -> Option<&StepStatus> {
        self.steps.iter().find(|s| s.name == name).map(|s| &s.status)
    }

    pub fn degraded_steps(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Degraded { .. }))
            .map(|s| s.name.as_str())
    }

    pub fn replayed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Replayed)
            .count()
    }
}
