//! Cross-turn conversation memory.
//!
//! `TherapyMemory` is supplied by the caller with each chat message, merged
//! with that turn's analysis, and handed back for the caller to persist.
//! The engine never stores it. Keys the engine does not model are carried
//! through unchanged at every level.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{lenient, MessageAnalysis, RiskLevel};

/// Per-conversation state threaded through chat workflow runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapyMemory {
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub session_context: SessionContext,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// What the conversation has learned about the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Observed emotional states, oldest first. Append-only.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub emotional_state: Vec<String>,

    /// Most recently observed risk level. Overwritten, never aggregated.
    #[serde(default, deserialize_with = "lenient::number")]
    pub risk_level: f64,

    #[serde(default, deserialize_with = "lenient::object")]
    pub preferences: Map<String, JsonValue>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// State of the current therapy conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// Themes raised so far, in order. Append-only, duplicates kept.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub conversation_themes: Vec<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub current_technique: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl TherapyMemory {
    /// Decodes memory from a payload value; anything but an object yields
    /// the zero value.
    pub fn from_json(value: Option<&JsonValue>) -> Self {
        match value {
            Some(value @ JsonValue::Object(_)) => {
                serde_json::from_value(value.clone()).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    /// Derives the memory after one analysed turn.
    ///
    /// The result depends only on `self` and `analysis`, so replaying the
    /// step against the same input memory yields the same output.
    pub fn merged_with(&self, analysis: &MessageAnalysis) -> Self {
        let mut next = self.clone();

        if !analysis.emotional_state.is_empty() {
            next.user_profile
                .emotional_state
                .push(analysis.emotional_state.clone());
        }

        next.session_context
            .conversation_themes
            .extend(analysis.themes.iter().cloned());

        // Only a real number replaces the stored level; quoted text does not.
        if let Some(risk_level) = analysis.risk_level.as_ref().and_then(RiskLevel::as_number) {
            next.user_profile.risk_level = risk_level;
        }

        next
    }
}
