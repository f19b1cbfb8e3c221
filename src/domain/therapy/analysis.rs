//! Structured analyses produced by the model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::lenient;

/// Risk level as the model reported it.
///
/// Models sometimes quote the number (`"riskLevel": "8"`). The text form is
/// kept as written so it round-trips to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RiskLevel {
    Number(f64),
    Text(String),
}

impl RiskLevel {
    /// The level only when it was a JSON number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RiskLevel::Number(n) => Some(*n),
            RiskLevel::Text(_) => None,
        }
    }

    /// The level as a number, reading numeric text too. Blank text reads as
    /// `0`, anything unparseable as `None`.
    pub fn as_comparable(&self) -> Option<f64> {
        match self {
            RiskLevel::Number(n) => Some(*n),
            RiskLevel::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Some(0.0);
                }
                text.parse::<f64>().ok().filter(|n| !n.is_nan())
            }
        }
    }
}

fn risk_level<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Number(n) => n.as_f64().map(RiskLevel::Number),
        JsonValue::String(text) => Some(RiskLevel::Text(text)),
        _ => None,
    })
}

/// Per-message analysis driving memory updates and the risk alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAnalysis {
    #[serde(default, deserialize_with = "lenient::string")]
    pub emotional_state: String,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub themes: Vec<String>,

    /// Present when the model supplied a number or a string.
    #[serde(
        default,
        deserialize_with = "risk_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_level: Option<RiskLevel>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub recommended_approach: String,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub progress_indicators: Vec<String>,
}

impl MessageAnalysis {
    /// The safe default substituted when analysis cannot be obtained.
    pub fn neutral() -> Self {
        Self {
            emotional_state: "neutral".to_string(),
            themes: Vec::new(),
            risk_level: Some(RiskLevel::Number(0.0)),
            recommended_approach: "supportive".to_string(),
            progress_indicators: Vec::new(),
        }
    }

    /// True when the reported risk is strictly above `threshold`. Numeric
    /// text counts.
    pub fn exceeds_risk(&self, threshold: f64) -> bool {
        self.risk_level
            .as_ref()
            .and_then(RiskLevel::as_comparable)
            .map_or(false, |risk| risk > threshold)
    }
}

/// Analysis of a completed therapy session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalysis {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub themes: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub emotional_state: String,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub areas_of_concern: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub progress_indicators: Vec<String>,
}

impl SessionAnalysis {
    pub fn has_concerns(&self) -> bool {
        !self.areas_of_concern.is_empty()
    }
}
