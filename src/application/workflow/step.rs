//! Step contracts.
//!
//! A step either cannot fail (`GuardedStep`, which substitutes a fallback and
//! reports `StepOutcome::Degraded`) or may abort the run (`FallibleStep`).
//! The policy is chosen per step when the workflow lists its steps.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::workflow::{StepContext, StepOutcome};

use super::StepError;

/// A step that recovers locally from every failure.
#[async_trait]
pub trait GuardedStep: Send + Sync {
    async fn run(&self, ctx: &StepContext) -> StepOutcome;
}

/// A step whose failure aborts the workflow run.
#[async_trait]
pub trait FallibleStep: Send + Sync {
    async fn run(&self, ctx: &StepContext) -> Result<StepOutcome, StepError>;
}

#[derive(Clone)]
pub enum StepKind {
    Guarded(Arc<dyn GuardedStep>),
    Fallible(Arc<dyn FallibleStep>),
}

/// A step and the name its output is checkpointed under.
#[derive(Clone)]
pub struct NamedStep {
    pub name: &'static str,
    pub kind: StepKind,
}

impl NamedStep {
    pub fn guarded(name: &'static str, step: impl GuardedStep + 'static) -> Self {
        Self {
            name,
            kind: StepKind::Guarded(Arc::new(step)),
        }
    }

    pub fn fallible(name: &'static str, step: impl FallibleStep + 'static) -> Self {
        Self {
            name,
            kind: StepKind::Fallible(Arc::new(step)),
        }
    }

    pub fn is_guarded(&self) -> bool {
        matches!(self.kind, StepKind::Guarded(_))
    }

    /// Runs the step once, without checkpointing.
    pub async fn invoke(&self, ctx: &StepContext) -> Result<StepOutcome, StepError> {
        match &self.kind {
            StepKind::Guarded(step) => Ok(step.run(ctx).await),
            StepKind::Fallible(step) => step.run(ctx).await,
        }
    }
}

impl fmt::Debug for NamedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedStep")
            .field("name", &self.name)
            .field("guarded", &self.is_guarded())
            .finish()
    }
}
