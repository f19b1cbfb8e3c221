//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the workflows and the outside world. Adapters implement these ports.
//!
//! ## Model Ports
//!
//! - `AIProvider` - Chat-completion provider
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Publishing workflow events
//! - `EventSubscriber` - Subscribing handlers by event name
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Durability and Side-Effect Ports
//!
//! - `CheckpointStore` - Completed-step log for replay
//! - `TherapyRepository` - Opaque document store for results
//! - `AlertSink` - One-way alert delivery

mod ai_provider;
mod alert_sink;
mod checkpoint_store;
mod event_publisher;
mod event_subscriber;
mod therapy_repository;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use alert_sink::AlertSink;
pub use checkpoint_store::{CheckpointError, CheckpointStore};
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use therapy_repository::{Collection, RecordKey, TherapyRepository};
