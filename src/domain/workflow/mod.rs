//! Workflow domain - Step outcomes, run context, checkpoints and reports.
//!
//! These are the value types the step runner passes around. The runner
//! itself lives in the application layer.

mod checkpoint;
mod context;
mod outcome;
mod report;

pub use checkpoint::Checkpoint;
pub use context::{ContextError, StepContext};
pub use outcome::StepOutcome;
pub use report::{RunReport, StepRecord, StepStatus};
