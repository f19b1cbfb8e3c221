//! Activity recommendations generated from a user's mood context.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::lenient;

/// How demanding a suggested activity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses a difficulty label, ignoring case and surrounding whitespace.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single suggested activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecommendation {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub reason: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub benefit: String,

    /// Unrecognised labels decode as `None`.
    #[serde(
        default,
        deserialize_with = "difficulty",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<Difficulty>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
}

/// The model's recommendation set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecommendations {
    /// Entries that are not objects are dropped.
    #[serde(default, deserialize_with = "activity_list")]
    pub activities: Vec<ActivityRecommendation>,
}

impl ActivityRecommendations {
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

fn difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(label) => Difficulty::parse(&label),
        _ => None,
    })
}

fn activity_list<'de, D>(deserializer: D) -> Result<Vec<ActivityRecommendation>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = lenient::list(deserializer)?;
    Ok(items
        .into_iter()
        .filter(JsonValue::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
