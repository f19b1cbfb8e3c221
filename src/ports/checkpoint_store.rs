//! CheckpointStore port - Durable log of completed workflow steps.
//!
//! The step runner writes a checkpoint after every step returns and reads
//! them back before invoking a step. A step with a checkpoint for the run is
//! replayed from the log instead of being executed again, so a re-delivered
//! event resumes where the earlier attempt stopped.

use async_trait::async_trait;

use crate::domain::foundation::RunId;
use crate::domain::workflow::Checkpoint;

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("Failed to serialize checkpoint for step '{step}': {reason}")]
    SerializationFailed { step: String, reason: String },

    #[error("Checkpoint for step '{step}' is corrupt: {reason}")]
    Corrupt { step: String, reason: String },

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CheckpointError {
    fn from(err: std::io::Error) -> Self {
        CheckpointError::Io(err.to_string())
    }
}

/// Port for persisting step checkpoints per run.
///
/// # Example
///
/// ```ignore
/// if let Some(checkpoint) = store.load(&run_id, "analyze-message").await? {
///     return Ok(checkpoint.output);
/// }
/// let outcome = step.run(&ctx).await;
/// store.save(&run_id, &Checkpoint::from_outcome("analyze-message", &outcome)).await?;
/// ```
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint for `step` in `run_id`, if one was written.
    async fn load(&self, run_id: &RunId, step: &str) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Record a completed step. Overwrites any earlier checkpoint of the
    /// same step.
    async fn save(&self, run_id: &RunId, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;

    /// Remove every checkpoint of a run. Returns how many were removed.
    async fn clear_run(&self, run_id: &RunId) -> Result<usize, CheckpointError>;
}
