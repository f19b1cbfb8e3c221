//! In-memory therapy repository.
//!
//! Stands in for the external document store in tests and in the
//! single-process worker, where results only need to live as long as the
//! process.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Collection, RecordKey, TherapyRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTherapyRepository {
    documents: Arc<RwLock<HashMap<RecordKey, JsonValue>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryTherapyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `put` fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Documents stored in one collection.
    pub async fn documents_in(&self, collection: Collection) -> Vec<JsonValue> {
        self.documents
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.collection == collection)
            .map(|(_, doc)| doc.clone())
            .collect()
    }
}

#[async_trait]
impl TherapyRepository for InMemoryTherapyRepository {
    async fn get(&self, key: &RecordKey) -> Result<Option<JsonValue>, DomainError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn put(&self, key: &RecordKey, document: JsonValue) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::StorageError, "document store unavailable")
                .with_detail("key", key.to_string()));
        }
        self.documents.write().await.insert(key.clone(), document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get() {
        let repo = InMemoryTherapyRepository::new();
        let key = RecordKey::new(Collection::SessionAnalyses, "s-1");

        repo.put(&key, json!({"themes": ["grief"]})).await.unwrap();

        assert_eq!(repo.get(&key).await.unwrap(), Some(json!({"themes": ["grief"]})));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn put_replaces_existing_document() {
        let repo = InMemoryTherapyRepository::new();
        let key = RecordKey::new(Collection::ActivityRecommendations, "u-1");

        repo.put(&key, json!(1)).await.unwrap();
        repo.put(&key, json!(2)).await.unwrap();

        assert_eq!(repo.get(&key).await.unwrap(), Some(json!(2)));
        assert_eq!(repo.documents_in(Collection::ActivityRecommendations).await.len(), 1);
        assert!(repo.documents_in(Collection::SessionAnalyses).await.is_empty());
    }

    #[tokio::test]
    async fn failing_writes_surface_storage_error() {
        let repo = InMemoryTherapyRepository::new();
        repo.fail_writes(true);

        let err = repo
            .put(&RecordKey::new(Collection::SessionAnalyses, "s"), json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(repo.is_empty().await);
    }
}
