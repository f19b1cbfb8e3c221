//! Workflow Step Runner.
//!
//! - `step` - Guarded and fallible step contracts, `NamedStep`
//! - `runner` - `Workflow` definitions and the checkpointing `WorkflowRunner`
//! - `output` - Caller-visible workflow results
//! - `errors` - `StepError` and `WorkflowError`

mod errors;
mod output;
mod runner;
mod step;

pub use errors::{StepError, WorkflowError};
pub use output::WorkflowOutput;
pub use runner::{Workflow, WorkflowRun, WorkflowRunner};
pub use step::{FallibleStep, GuardedStep, NamedStep, StepKind};
