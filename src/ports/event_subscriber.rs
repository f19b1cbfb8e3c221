//! EventSubscriber port - Interface for subscribing to workflow events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, WorkflowEvent};

/// Handler for processing workflow events.
///
/// Implementations should be idempotent: re-delivery of the same event
/// must not repeat completed side effects.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: WorkflowEvent) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to events by name.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event name.
    fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe the same handler to several event names.
    fn subscribe_all(&self, event_names: &[&str], handler: Arc<dyn EventHandler>);
}

/// An event bus publishes and subscribes.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
