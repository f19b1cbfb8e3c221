//! EventPublisher port - Interface for publishing workflow events.
//!
//! Callers publish events without knowing about the transport (in-memory
//! bus, hosted event service, etc.).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, WorkflowEvent};

/// Port for publishing workflow events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (handlers may receive duplicates)
/// - Errors are propagated to the caller
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: WorkflowEvent) -> Result<(), DomainError>;

    /// Publish several events in order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<WorkflowEvent>) -> Result<(), DomainError>;
}
