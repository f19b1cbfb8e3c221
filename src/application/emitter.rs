//! EventEmitter - publishes the outbound event family at the boundary.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::domain::foundation::{DomainError, WorkflowEvent};
use crate::domain::therapy::OutboundEvents;
use crate::ports::EventPublisher;

/// Emits domain events when sessions, moods and activities are recorded.
///
/// Failures are logged and returned; the caller decides whether a missed
/// event should fail its own operation.
pub struct EventEmitter {
    publisher: Arc<dyn EventPublisher>,
}

impl EventEmitter {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    pub async fn session_created(&self, session: &Map<String, JsonValue>) -> Result<(), DomainError> {
        self.emit(OutboundEvents::session_created(session)).await
    }

    pub async fn mood_updated(&self, mood: &Map<String, JsonValue>) -> Result<(), DomainError> {
        self.emit(OutboundEvents::mood_updated(mood)).await
    }

    pub async fn activity_completed(
        &self,
        activity: &Map<String, JsonValue>,
    ) -> Result<(), DomainError> {
        self.emit(OutboundEvents::activity_completed(activity)).await
    }

    async fn emit(&self, event: WorkflowEvent) -> Result<(), DomainError> {
        let name = event.name.clone();
        let event_id = event.id.clone();
        let user_id = event.metadata.user_id.clone().unwrap_or_default();

        match self.publisher.publish(event).await {
            Ok(()) => {
                tracing::info!(event = %name, event_id = %event_id, user_id = %user_id, "Event emitted");
                Ok(())
            }
            Err(error) => {
                tracing::error!(event = %name, event_id = %event_id, error = %error, "Event emission failed");
                Err(error)
            }
        }
    }
}
