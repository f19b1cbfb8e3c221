//! Domain layer containing workflow and therapy types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, events, errors)
//! - `extraction` - JSON recovery from free-text model output
//! - `therapy` - Conversation memory, analyses, payloads and prompts
//! - `alerting` - Alert kinds and events
//! - `workflow` - Step outcomes, context, checkpoints and run reports

pub mod alerting;
pub mod extraction;
pub mod foundation;
pub mod therapy;
pub mod workflow;
