//! Events emitted at the boundary when records are created.
//!
//! Each event carries a canonical field set merged with the caller's
//! payload. Caller-supplied keys win on collision and canonical fields the
//! caller did not provide are omitted rather than sent as `null`.

use serde_json::{Map, Value as JsonValue};

use crate::domain::foundation::{Timestamp, WorkflowEvent};

pub const SESSION_CREATED: &str = "therapy/session.created";
pub const MOOD_UPDATED: &str = "mood/updated";
pub const ACTIVITY_COMPLETED: &str = "activity/completed";

/// Builders for the outbound event family.
pub struct OutboundEvents;

impl OutboundEvents {
    /// `therapy/session.created` from a saved session record.
    pub fn session_created(session: &Map<String, JsonValue>) -> WorkflowEvent {
        let mut canonical = Canonical::new(session);
        canonical.copy_as("id", "sessionId");
        canonical.copy("userId");
        canonical.timestamp();
        canonical.set(
            "requiresFollowUp",
            session
                .get("requiresFollowUp")
                .filter(|v| truthy(v))
                .cloned()
                .unwrap_or(JsonValue::Bool(false)),
        );
        canonical.copy_as("type", "sessionType");
        canonical.copy("duration");
        canonical.copy("notes");
        canonical.into_event(SESSION_CREATED)
    }

    /// `mood/updated` from a saved mood entry.
    pub fn mood_updated(mood: &Map<String, JsonValue>) -> WorkflowEvent {
        let mut canonical = Canonical::new(mood);
        canonical.copy("userId");
        canonical.copy("mood");
        canonical.timestamp();
        canonical.copy("context");
        canonical.copy("activities");
        canonical.copy("notes");
        canonical.into_event(MOOD_UPDATED)
    }

    /// `activity/completed` from a logged activity.
    pub fn activity_completed(activity: &Map<String, JsonValue>) -> WorkflowEvent {
        let mut canonical = Canonical::new(activity);
        canonical.copy("userId");
        canonical.copy_as("id", "activityId");
        canonical.timestamp();
        canonical.copy("duration");
        canonical.copy("difficulty");
        canonical.copy("feedback");
        canonical.into_event(ACTIVITY_COMPLETED)
    }
}

struct Canonical<'a> {
    source: &'a Map<String, JsonValue>,
    fields: Map<String, JsonValue>,
}

impl<'a> Canonical<'a> {
    fn new(source: &'a Map<String, JsonValue>) -> Self {
        Self {
            source,
            fields: Map::new(),
        }
    }

    fn copy(&mut self, key: &str) {
        self.copy_as(key, key);
    }

    fn copy_as(&mut self, from: &str, to: &str) {
        match self.source.get(from) {
            Some(JsonValue::Null) | None => {}
            Some(value) => {
                self.fields.insert(to.to_string(), value.clone());
            }
        }
    }

    fn set(&mut self, key: &str, value: JsonValue) {
        self.fields.insert(key.to_string(), value);
    }

    fn timestamp(&mut self) {
        self.set("timestamp", JsonValue::String(Timestamp::now().to_iso_string()));
    }

    fn into_event(self, name: &str) -> WorkflowEvent {
        let mut data = self.fields;
        for (key, value) in self.source {
            data.insert(key.clone(), value.clone());
        }

        let user_id = data.get("userId").and_then(JsonValue::as_str).map(str::to_string);
        let event = WorkflowEvent::new(name, JsonValue::Object(data));
        match user_id {
            Some(user_id) => event.with_user_id(user_id),
            None => event,
        }
    }
}

fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}
