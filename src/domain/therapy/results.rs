//! Final results returned to the caller by each workflow.

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::{ActivityRecommendations, MessageAnalysis, SessionAnalysis, TherapyMemory};

/// Reply when the response model call fails.
pub const RESPONSE_ON_ERROR: &str = "I'm here with you. Tell me more about what's on your mind.";

/// Reply when the response model returns no content.
pub const RESPONSE_ON_EMPTY: &str = "I'm here with you. Tell me more about how you're feeling.";

/// Reply when the whole chat run fails.
pub const RESPONSE_LAST_RESORT: &str = "I'm here to support you.";

/// Result of `process-chat-message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResult {
    pub response: String,

    /// `None` only on the last-resort path; serialized as `{}`.
    #[serde(serialize_with = "analysis_or_empty")]
    pub analysis: Option<MessageAnalysis>,

    /// Memory to persist. On the last-resort path this is the caller's
    /// original memory value, untouched.
    pub updated_memory: JsonValue,
}

impl ChatTurnResult {
    pub fn new(response: String, analysis: MessageAnalysis, memory: &TherapyMemory) -> Self {
        Self {
            response,
            analysis: Some(analysis),
            updated_memory: serde_json::to_value(memory).unwrap_or(JsonValue::Null),
        }
    }

    pub fn last_resort(original_memory: Option<JsonValue>) -> Self {
        Self {
            response: RESPONSE_LAST_RESORT.to_string(),
            analysis: None,
            updated_memory: original_memory.unwrap_or(JsonValue::Null),
        }
    }

    /// The returned memory decoded, zero value when absent.
    pub fn memory(&self) -> TherapyMemory {
        TherapyMemory::from_json(Some(&self.updated_memory))
    }

    pub fn is_last_resort(&self) -> bool {
        self.analysis.is_none()
    }
}

fn analysis_or_empty<S: Serializer>(
    analysis: &Option<MessageAnalysis>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match analysis {
        Some(analysis) => analysis.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// Result of `analyze-therapy-session`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAnalysisResult {
    pub message: String,
    pub analysis: SessionAnalysis,
}

impl SessionAnalysisResult {
    pub fn completed(analysis: SessionAnalysis) -> Self {
        Self {
            message: "Session analysis completed".to_string(),
            analysis,
        }
    }
}

/// Result of `generate-activity-recommendations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationsResult {
    pub message: String,
    pub recommendations: ActivityRecommendations,
}

impl RecommendationsResult {
    pub fn generated(recommendations: ActivityRecommendations) -> Self {
        Self {
            message: "Activity recommendations generated".to_string(),
            recommendations,
        }
    }
}
