//! WorkflowRunner - checkpointed, strictly sequential step execution.
//!
//! For each step the runner first consults the checkpoint store. A step that
//! already has a checkpoint for this run is replayed from it and never
//! invoked again. Otherwise the step runs, and its outcome is checkpointed
//! before the next step starts.

use std::sync::Arc;

use tracing::Instrument;

use crate::domain::foundation::{RunId, WorkflowEvent};
use crate::domain::workflow::{Checkpoint, RunReport, StepContext, StepStatus};
use crate::ports::{CheckpointError, CheckpointStore};

use super::{NamedStep, WorkflowError, WorkflowOutput};

/// A fixed, named, ordered sequence of steps triggered by one event name.
pub trait Workflow: Send + Sync {
    /// Stable identifier, also the prefix of every run id.
    fn id(&self) -> &'static str;

    /// Event name that starts this workflow.
    fn trigger(&self) -> &'static str;

    /// Steps in execution order.
    fn steps(&self) -> Vec<NamedStep>;

    /// Assembles the caller-visible result from step outputs.
    fn finish(&self, ctx: &StepContext) -> Result<WorkflowOutput, WorkflowError>;

    /// Run-level safety net. `Some` replaces the error with a result.
    fn recover(&self, _event: &WorkflowEvent, _error: &WorkflowError) -> Option<WorkflowOutput> {
        None
    }
}

/// Output of a run plus how each step produced its value.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub output: WorkflowOutput,
    pub report: RunReport,
}

pub struct WorkflowRunner {
    checkpoints: Arc<dyn CheckpointStore>,
}

impl WorkflowRunner {
    pub fn new(checkpoints: Arc<dyn CheckpointStore>) -> Self {
        Self { checkpoints }
    }

    /// Runs `workflow` for `event`.
    ///
    /// The run id is derived from the workflow id and event id, so delivering
    /// the same event again resumes from its checkpoints.
    pub async fn run(
        &self,
        workflow: &dyn Workflow,
        event: WorkflowEvent,
    ) -> Result<WorkflowRun, WorkflowError> {
        let run_id = RunId::for_event(workflow.id(), &event.id);
        let span = tracing::info_span!(
            "workflow",
            workflow = workflow.id(),
            run_id = %run_id,
            event_id = %event.id,
        );

        async move {
            tracing::info!(event = %event.name, "Workflow started");
            let mut report = RunReport::new(workflow.id(), run_id.clone());

            match self.execute(workflow, &run_id, &event, &mut report).await {
                Ok(output) => {
                    tracing::info!(
                        steps = report.steps.len(),
                        replayed = report.replayed_count(),
                        "Workflow completed"
                    );
                    Ok(WorkflowRun { output, report })
                }
                Err(error) => match workflow.recover(&event, &error) {
                    Some(output) => {
                        tracing::error!(error = %error, "Workflow failed, returning recovery result");
                        report.recovered_from = Some(error.to_string());
                        Ok(WorkflowRun { output, report })
                    }
                    None => {
                        tracing::error!(error = %error, "Workflow failed");
                        Err(error)
                    }
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Drops every checkpoint of `run_id`. Returns how many were removed.
    pub async fn discard_run(&self, run_id: &RunId) -> Result<usize, CheckpointError> {
        let removed = self.checkpoints.clear_run(run_id).await?;
        tracing::debug!(run_id = %run_id, removed = removed, "Discarded run checkpoints");
        Ok(removed)
    }

    async fn execute(
        &self,
        workflow: &dyn Workflow,
        run_id: &RunId,
        event: &WorkflowEvent,
        report: &mut RunReport,
    ) -> Result<WorkflowOutput, WorkflowError> {
        let mut ctx = StepContext::new(run_id.clone(), event.clone());

        for step in workflow.steps() {
            if let Some(checkpoint) = self.checkpoints.load(run_id, step.name).await? {
                tracing::debug!(step = step.name, "Replaying step from checkpoint");
                report.push(step.name, StepStatus::Replayed);
                ctx.record(step.name, checkpoint.output);
                continue;
            }

            tracing::debug!(step = step.name, "Running step");
            let outcome = step
                .invoke(&ctx)
                .await
                .map_err(|source| WorkflowError::step_failed(step.name, source))?;

            self.checkpoints
                .save(run_id, &Checkpoint::from_outcome(step.name, &outcome))
                .await?;

            let status = match outcome.degraded_reason() {
                Some(reason) => {
                    tracing::warn!(step = step.name, reason = %reason, "Step degraded to fallback");
                    StepStatus::Degraded {
                        reason: reason.to_string(),
                    }
                }
                None => StepStatus::Completed,
            };
            report.push(step.name, status);
            ctx.record(step.name, outcome.into_value());
        }

        workflow.finish(&ctx)
    }
}
