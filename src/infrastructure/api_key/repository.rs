//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository};

/// In-memory implementation of ApiKeyRepository
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<String, ApiKeyRecord>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get(&self, key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(key).cloned())
    }

    async fn insert(&self, record: ApiKeyRecord) -> Result<(), DomainError> {
        let mut keys = self.keys.write().await;

        match keys.entry(record.key().to_string()) {
            Entry::Occupied(_) => Err(DomainError::duplicate_key(record.key())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.keys.read().await.len())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.keys.read().await.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: &str, key: &str) -> ApiKeyRecord {
        ApiKeyRecord::new(owner, key).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryApiKeyRepository::new();

        repo.insert(record("alice", "sk-alice")).await.unwrap();

        let found = repo.get("sk-alice").await.unwrap().unwrap();
        assert_eq!(found.owner(), "alice");
        assert!(repo.exists("sk-alice").await.unwrap());
        assert!(!repo.exists("sk-bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_leaves_original() {
        let repo = InMemoryApiKeyRepository::new();

        repo.insert(record("alice", "sk-shared")).await.unwrap();
        let result = repo.insert(record("mallory", "sk-shared")).await;

        assert!(matches!(result, Err(DomainError::DuplicateKey { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(
            repo.get("sk-shared").await.unwrap().unwrap().owner(),
            "alice"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_inserts() {
        let repo = Arc::new(InMemoryApiKeyRepository::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.insert(record(&format!("owner-{}", i), "sk-contended"))
                        .await
                })
            })
            .collect();

        let mut added = 0;
        let mut duplicates = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => added += 1,
                Err(DomainError::DuplicateKey { .. }) => duplicates += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(added, 1);
        assert_eq!(duplicates, 31);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
