//! EventRouter - maps event names to the workflow they trigger.
//!
//! Each trigger maps to exactly one workflow. Events nobody listens for are
//! ignored rather than rejected, so the router can sit on a shared bus.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::application::workflow::{Workflow, WorkflowError, WorkflowRun, WorkflowRunner};
use crate::domain::foundation::{DomainError, RunId, WorkflowEvent};
use crate::ports::EventHandler;

/// What happened to a dispatched event.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Handled {
        workflow_id: &'static str,
        run: WorkflowRun,
    },
    Unhandled {
        event_name: String,
    },
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }

    pub fn run(&self) -> Option<&WorkflowRun> {
        match self {
            DispatchOutcome::Handled { run, .. } => Some(run),
            DispatchOutcome::Unhandled { .. } => None,
        }
    }
}

pub struct EventRouter {
    runner: WorkflowRunner,
    workflows: HashMap<&'static str, Arc<dyn Workflow>>,
}

impl EventRouter {
    pub fn new(runner: WorkflowRunner) -> Self {
        Self {
            runner,
            workflows: HashMap::new(),
        }
    }

    pub fn with_workflow(mut self, workflow: impl Workflow + 'static) -> Self {
        self.register(Arc::new(workflow));
        self
    }

    /// Registers `workflow` for its trigger, replacing any previous one.
    pub fn register(&mut self, workflow: Arc<dyn Workflow>) {
        let trigger = workflow.trigger();
        if let Some(previous) = self.workflows.insert(trigger, Arc::clone(&workflow)) {
            tracing::warn!(
                trigger = trigger,
                replaced = previous.id(),
                workflow = workflow.id(),
                "Replacing workflow registered for trigger"
            );
        }
    }

    /// Event names with a registered workflow, sorted.
    pub fn topics(&self) -> Vec<&'static str> {
        let mut topics: Vec<_> = self.workflows.keys().copied().collect();
        topics.sort_unstable();
        topics
    }

    /// Runs the workflow triggered by `event`, if any.
    pub async fn dispatch(&self, event: WorkflowEvent) -> Result<DispatchOutcome, WorkflowError> {
        let Some(workflow) = self.workflows.get(event.name.as_str()) else {
            tracing::debug!(event = %event.name, event_id = %event.id, "No workflow for event");
            return Ok(DispatchOutcome::Unhandled {
                event_name: event.name,
            });
        };

        let run = self.runner.run(workflow.as_ref(), event).await?;
        Ok(DispatchOutcome::Handled {
            workflow_id: workflow.id(),
            run,
        })
    }

    /// Like `dispatch`, for an event that will never be delivered again.
    ///
    /// The run cannot be resumed, so its checkpoints are dropped once it
    /// ends, whether it succeeded or not.
    pub async fn dispatch_once(&self, event: WorkflowEvent) -> Result<DispatchOutcome, WorkflowError> {
        let run_id = self
            .workflows
            .get(event.name.as_str())
            .map(|workflow| RunId::for_event(workflow.id(), &event.id));

        let result = self.dispatch(event).await;

        if let Some(run_id) = run_id {
            if let Err(error) = self.runner.discard_run(&run_id).await {
                tracing::warn!(run_id = %run_id, error = %error, "Failed to drop checkpoints of one-off run");
            }
        }
        result
    }

    /// Dispatches independent events concurrently. Results keep input order.
    pub async fn dispatch_all(
        &self,
        events: Vec<WorkflowEvent>,
    ) -> Vec<Result<DispatchOutcome, WorkflowError>> {
        join_all(events.into_iter().map(|event| self.dispatch(event))).await
    }
}

#[async_trait]
impl EventHandler for EventRouter {
    async fn handle(&self, event: WorkflowEvent) -> Result<(), DomainError> {
        self.dispatch(event).await.map(|_| ()).map_err(DomainError::from)
    }

    fn name(&self) -> &'static str {
        "EventRouter"
    }
}
