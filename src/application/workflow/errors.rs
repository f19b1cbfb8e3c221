use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::workflow::ContextError;
use crate::ports::{AIError, CheckpointError};

/// Failure inside a fallible step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("completion failed: {0}")]
    Completion(#[from] AIError),

    #[error("persistence failed: {0}")]
    Persistence(#[source] DomainError),

    #[error("invalid event payload: {0}")]
    InvalidPayload(#[source] DomainError),

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Failure of a whole workflow run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: StepError,
    },

    #[error("checkpoint store failed: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("could not assemble workflow output: {0}")]
    Output(#[from] ContextError),
}

impl WorkflowError {
    pub fn step_failed(step: impl Into<String>, source: StepError) -> Self {
        WorkflowError::StepFailed {
            step: step.into(),
            source,
        }
    }

    /// Name of the failing step, if a step failed.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            WorkflowError::StepFailed { step, .. } => Some(step),
            _ => None,
        }
    }

    /// True if the caller may succeed by re-delivering the event.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::StepFailed {
                source: StepError::Completion(e),
                ..
            } => e.is_retryable(),
            WorkflowError::StepFailed {
                source: StepError::Persistence(_),
                ..
            } => true,
            WorkflowError::Checkpoint(_) => true,
            _ => false,
        }
    }
}

impl From<WorkflowError> for DomainError {
    fn from(err: WorkflowError) -> Self {
        let code = match &err {
            WorkflowError::StepFailed { source, .. } => match source {
                StepError::Completion(_) => ErrorCode::AIProviderError,
                StepError::Persistence(_) => ErrorCode::StorageError,
                StepError::InvalidPayload(_) => ErrorCode::InvalidPayload,
                StepError::Context(_) => ErrorCode::InternalError,
            },
            WorkflowError::Checkpoint(_) => ErrorCode::StorageError,
            WorkflowError::Output(_) => ErrorCode::InternalError,
        };
        let step = err.failed_step().map(str::to_string);
        let error = DomainError::new(code, err.to_string());
        match step {
            Some(step) => error.with_detail("step", step),
            None => error,
        }
    }
}
