//! Therapy Workflows - durable step workflows for an AI therapy assistant.
//!
//! Three event-triggered workflows run as checkpointed step sequences:
//! chat message processing, session analysis, and activity recommendations.
//! Model calls go through an OpenAI-compatible provider; persistence, alerts,
//! checkpoints and the event bus sit behind ports.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
