//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the workflow event envelope and the
//! error types that form the vocabulary of the workflow engine.

mod errors;
mod events;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use events::{EventId, EventMetadata, WorkflowEvent};
pub use ids::RunId;
pub use timestamp::Timestamp;
