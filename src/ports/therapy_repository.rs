//! TherapyRepository port - Opaque persistence for workflow results.
//!
//! The document store behind chat sessions, moods and activities is owned by
//! another service. Workflows only need to put and get JSON documents keyed
//! by collection and session/user identifier.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::DomainError;

/// Collections the workflows write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Keyed by session id.
    SessionAnalyses,
    /// Keyed by user id.
    ActivityRecommendations,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::SessionAnalyses => "session_analyses",
            Collection::ActivityRecommendations => "activity_recommendations",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub collection: Collection,
    pub id: String,
}

impl RecordKey {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Port for the external document store.
#[async_trait]
pub trait TherapyRepository: Send + Sync {
    /// Fetch a document, `None` when absent.
    async fn get(&self, key: &RecordKey) -> Result<Option<JsonValue>, DomainError>;

    /// Insert or replace a document.
    async fn put(&self, key: &RecordKey, document: JsonValue) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn TherapyRepository) {}

    #[test]
    fn record_key_displays_as_path() {
        let key = RecordKey::new(Collection::SessionAnalyses, "s-1");
        assert_eq!(key.to_string(), "session_analyses/s-1");
    }
}
