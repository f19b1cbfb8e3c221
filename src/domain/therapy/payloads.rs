//! Inbound event payloads for the three therapy workflows.
//!
//! Payloads are decoded leniently: fields of the wrong type decode as empty
//! values. Only a payload that is not a JSON object is rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainError, ErrorCode, WorkflowEvent};

use super::{lenient, TherapyMemory};

fn decode<T: DeserializeOwned>(event: &WorkflowEvent) -> Result<T, DomainError> {
    if !event.data.is_object() {
        return Err(DomainError::new(
            ErrorCode::InvalidPayload,
            format!("Event '{}' payload must be a JSON object", event.name),
        ));
    }
    event.payload_as().map_err(|e| {
        DomainError::new(ErrorCode::InvalidPayload, e.to_string())
            .with_detail("event", event.name.clone())
    })
}

/// Payload of `therapy/session.message`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,

    #[serde(default, deserialize_with = "lenient::list")]
    pub history: Vec<JsonValue>,

    /// The caller's memory exactly as supplied.
    #[serde(default, deserialize_with = "lenient::present")]
    pub memory: Option<JsonValue>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub goals: Vec<JsonValue>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub system_prompt: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub session_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub user_id: Option<String>,
}

impl ChatMessagePayload {
    pub fn from_event(event: &WorkflowEvent) -> Result<Self, DomainError> {
        decode(event)
    }

    /// The supplied memory, or the zero value when absent.
    pub fn memory(&self) -> TherapyMemory {
        TherapyMemory::from_json(self.memory.as_ref())
    }
}

/// Payload of `therapy/session.created`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreatedPayload {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub session_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub user_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub notes: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub transcript: Option<String>,
}

impl SessionCreatedPayload {
    pub fn from_event(event: &WorkflowEvent) -> Result<Self, DomainError> {
        decode(event)
    }

    /// Notes, else transcript, else the empty string.
    pub fn content(&self) -> String {
        self.notes
            .as_deref()
            .or(self.transcript.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Payload of `mood/updated`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodUpdatedPayload {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub user_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::present")]
    pub recent_moods: Option<JsonValue>,

    #[serde(default, deserialize_with = "lenient::present")]
    pub completed_activities: Option<JsonValue>,

    #[serde(default, deserialize_with = "lenient::present")]
    pub preferences: Option<JsonValue>,
}

impl MoodUpdatedPayload {
    pub fn from_event(event: &WorkflowEvent) -> Result<Self, DomainError> {
        decode(event)
    }

    /// Projects the fields the recommendation prompt needs.
    pub fn user_context(&self) -> UserContext {
        UserContext {
            recent_moods: self.recent_moods.clone(),
            completed_activities: self.completed_activities.clone(),
            preferences: self.preferences.clone(),
        }
    }
}

/// Pass-through projection of a mood update. Absent fields stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_moods: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_activities: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<JsonValue>,
}
