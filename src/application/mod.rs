//! Application layer - workflows and the services they are built from.
//!
//! - `completion` - Single-turn model calls
//! - `alerting` - Condition-gated alerts
//! - `workflow` - Step contracts and the checkpointing runner
//! - `workflows` - The three therapy workflows
//! - `router` - Event name to workflow dispatch
//! - `emitter` - Outbound event publishing

pub mod alerting;
pub mod completion;
pub mod emitter;
pub mod router;
pub mod workflow;
pub mod workflows;

pub use alerting::AlertTrigger;
pub use completion::CompletionClient;
pub use emitter::EventEmitter;
pub use router::{DispatchOutcome, EventRouter};
pub use workflow::{
    FallibleStep, GuardedStep, NamedStep, StepError, Workflow, WorkflowError, WorkflowOutput,
    WorkflowRun, WorkflowRunner,
};
pub use workflows::{
    therapy_router, AnalyzeTherapySession, GenerateActivityRecommendations, ProcessChatMessage,
    WorkflowDeps, DEFAULT_RISK_THRESHOLD,
};
