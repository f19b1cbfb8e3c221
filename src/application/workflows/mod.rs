//! The three therapy workflows and their shared dependencies.
//!
//! | Workflow | Trigger |
//! |----------|---------|
//! | `process-chat-message` | `therapy/session.message` |
//! | `analyze-therapy-session` | `therapy/session.created` |
//! | `generate-activity-recommendations` | `mood/updated` |

mod chat;
mod recommendations;
mod session;

pub use chat::ProcessChatMessage;
pub use recommendations::GenerateActivityRecommendations;
pub use session::AnalyzeTherapySession;

use std::sync::Arc;

use crate::application::router::EventRouter;
use crate::application::workflow::WorkflowRunner;
use crate::application::{AlertTrigger, CompletionClient};
use crate::domain::workflow::StepContext;
use crate::ports::{CheckpointStore, RequestMetadata, TherapyRepository};

/// Risk level above which the chat workflow raises a risk alert.
pub const DEFAULT_RISK_THRESHOLD: f64 = 4.0;

/// Collaborators injected into every workflow.
#[derive(Clone)]
pub struct WorkflowDeps {
    pub completion: Arc<CompletionClient>,
    pub repository: Arc<dyn TherapyRepository>,
    pub alerts: AlertTrigger,
    pub risk_threshold: f64,
}

impl WorkflowDeps {
    pub fn new(
        completion: Arc<CompletionClient>,
        repository: Arc<dyn TherapyRepository>,
        alerts: AlertTrigger,
    ) -> Self {
        Self {
            completion,
            repository,
            alerts,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
        }
    }

    pub fn with_risk_threshold(mut self, threshold: f64) -> Self {
        self.risk_threshold = threshold;
        self
    }
}

/// Router with all three therapy workflows registered.
pub fn therapy_router(deps: WorkflowDeps, checkpoints: Arc<dyn CheckpointStore>) -> EventRouter {
    EventRouter::new(WorkflowRunner::new(checkpoints))
        .with_workflow(ProcessChatMessage::new(deps.clone()))
        .with_workflow(AnalyzeTherapySession::new(deps.clone()))
        .with_workflow(GenerateActivityRecommendations::new(deps))
}

/// Request metadata tagging a completion with the calling step.
fn step_metadata(ctx: &StepContext, workflow: &str, step: &str) -> RequestMetadata {
    RequestMetadata::for_step(ctx.run_id().as_str(), workflow, step)
}
