//! Workflow engine configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Chat risk alerts fire when the analysed risk is strictly above this
    #[serde(default = "default_risk_threshold")]
    pub risk_alert_threshold: f64,

    /// Directory for file checkpoints; in-memory checkpoints when unset
    pub checkpoint_dir: Option<PathBuf>,

    /// Runs the in-memory checkpoint store keeps before evicting the oldest
    #[serde(default = "default_checkpoint_max_runs")]
    pub checkpoint_max_runs: usize,
}

impl WorkflowConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.risk_alert_threshold.is_finite() {
            return Err(ValidationError::InvalidRiskThreshold);
        }
        if self.checkpoint_max_runs == 0 {
            return Err(ValidationError::InvalidCheckpointLimit);
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            risk_alert_threshold: default_risk_threshold(),
            checkpoint_dir: None,
            checkpoint_max_runs: default_checkpoint_max_runs(),
        }
    }
}

fn default_risk_threshold() -> f64 {
    4.0
}

fn default_checkpoint_max_runs() -> usize {
    1024
}
