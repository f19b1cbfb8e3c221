//! In-memory event bus.
//!
//! Delivers events to subscribed handlers in subscription order, in the
//! publishing task. Keeps every published event for inspection, which makes
//! it the bus of choice for tests and the single-process worker.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{DomainError, ErrorCode, WorkflowEvent};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

type HandlerMap = HashMap<String, Vec<Arc<dyn EventHandler>>>;

/// In-memory event bus.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.subscribe_all(&router.topics(), router.clone());
/// bus.publish(event).await?;
/// assert!(bus.has_event("mood/updated"));
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<HandlerMap>,
    published: RwLock<Vec<WorkflowEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    // A poisoned lock only means a handler panicked mid-write; the data is
    // still a valid Vec/HashMap.
    fn read_published(&self) -> RwLockReadGuard<'_, Vec<WorkflowEvent>> {
        self.published.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_published(&self) -> RwLockWriteGuard<'_, Vec<WorkflowEvent>> {
        self.published.write().unwrap_or_else(|e| e.into_inner())
    }

    fn write_handlers(&self) -> RwLockWriteGuard<'_, HandlerMap> {
        self.handlers.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<WorkflowEvent> {
        self.read_published().clone()
    }

    /// Returns events with a specific name.
    pub fn events_named(&self, name: &str) -> Vec<WorkflowEvent> {
        self.read_published()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.write_published().clear();
    }

    pub fn event_count(&self) -> usize {
        self.read_published().len()
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.read_published().iter().any(|e| e.name == name)
    }

    /// Number of handlers subscribed to `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .map_or(0, Vec::len)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: WorkflowEvent) -> Result<(), DomainError> {
        self.write_published().push(event.clone());

        // Clone handlers to release lock before await points
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&event.name)
            .cloned()
            .unwrap_or_default();

        let mut errors = Vec::new();
        for handler in handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                tracing::warn!(
                    handler = handler.name(),
                    event = %event.name,
                    error = %e,
                    "Event handler failed"
                );
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::EventDeliveryFailed,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }

        Ok(())
    }

    async fn publish_all(&self, events: Vec<WorkflowEvent>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>) {
        self.write_handlers()
            .entry(event_name.to_string())
            .or_default()
            .push(handler);
    }

    fn subscribe_all(&self, event_names: &[&str], handler: Arc<dyn EventHandler>) {
        let mut handlers = self.write_handlers();
        for name in event_names {
            handlers
                .entry(name.to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }
}
