//! Event infrastructure for workflow triggering.
//!
//! - `EventId` - Unique identifier for events (deduplication, run ids)
//! - `EventMetadata` - Tracing and correlation context
//! - `WorkflowEvent` - Transport wrapper carrying an event name and JSON data

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// Unique identifier for events (used for deduplication).
///
/// Uses a String internally so ids minted by other producers (UUID, ULID,
/// provider-specific) survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for tracing and correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// ID linking related events across a single user request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// User who initiated the action that led to this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Distributed tracing span/trace ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// An event on the workflow bus: a name selecting the workflow and the data
/// it consumes.
///
/// Created by the caller, consumed once, never mutated by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Unique ID for this event instance. Re-deliveries keep the same id.
    #[serde(default)]
    pub id: EventId,

    /// Event name used for routing (e.g. "therapy/session.message").
    pub name: String,

    /// Event-specific payload.
    #[serde(default = "empty_object")]
    pub data: JsonValue,

    /// When the event was produced.
    #[serde(default = "Timestamp::now")]
    pub occurred_at: Timestamp,

    /// Tracing and correlation metadata.
    #[serde(default)]
    pub metadata: EventMetadata,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Map::new())
}

impl WorkflowEvent {
    /// Creates a new event with a fresh id.
    pub fn new(name: impl Into<String>, data: JsonValue) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            data,
            occurred_at: Timestamp::now(),
            metadata: EventMetadata::default(),
        }
    }

    /// Replaces the event id (re-delivery of a known event).
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }

    /// Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    /// Add user ID for audit.
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(id.into());
        self
    }

    /// Add trace ID for distributed tracing.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.trace_id = Some(id.into());
        self
    }

    /// Returns a single top-level field of the payload, if present.
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    /// Deserialize payload to a specific type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_id_generates_unique_values() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn event_id_round_trips_foreign_ids() {
        let id = EventId::from_string("01HV3K6Z2Q");
        assert_eq!(id.as_str(), "01HV3K6Z2Q");
        assert_eq!(id.to_string(), "01HV3K6Z2Q");
    }

    #[test]
    fn event_builder_sets_metadata() {
        let event = WorkflowEvent::new("mood/updated", json!({}))
            .with_correlation_id("corr-1")
            .with_user_id("user-1")
            .with_trace_id("trace-1");

        assert_eq!(event.metadata.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(event.metadata.user_id.as_deref(), Some("user-1"));
        assert_eq!(event.metadata.trace_id.as_deref(), Some("trace-1"));
    }

    #[test]
    fn event_deserializes_from_minimal_bus_shape() {
        let event: WorkflowEvent =
            serde_json::from_value(json!({"name": "therapy/session.message", "data": {"message": "hi"}}))
                .unwrap();

        assert_eq!(event.name, "therapy/session.message");
        assert_eq!(event.field("message"), Some(&json!("hi")));
        assert!(!event.id.as_str().is_empty());
    }

    #[test]
    fn missing_data_defaults_to_empty_object() {
        let event: WorkflowEvent = serde_json::from_value(json!({"name": "mood/updated"})).unwrap();
        assert_eq!(event.data, json!({}));
    }

    #[test]
    fn payload_as_deserializes_data() {
        #[derive(Deserialize)]
        struct Payload {
            message: String,
        }

        let event = WorkflowEvent::new("x", json!({"message": "hello"}));
        let payload: Payload = event.payload_as().unwrap();
        assert_eq!(payload.message, "hello");
    }
}
