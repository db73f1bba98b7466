//! API key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::ApiKeyRecord;
use crate::domain::DomainError;

/// Repository trait for the durable key registry
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Get a record by its key
    async fn get(&self, key: &str) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Insert a new record
    ///
    /// Must be atomic: when two inserts race for the same key exactly one
    /// succeeds and the other returns `DomainError::DuplicateKey`.
    async fn insert(&self, record: ApiKeyRecord) -> Result<(), DomainError>;

    /// Number of registered keys
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Repository whose every operation fails with a persistence error
    #[derive(Debug, Default)]
    pub struct FailingApiKeyRepository {
        fail_reads: AtomicBool,
    }

    impl FailingApiKeyRepository {
        pub fn new() -> Self {
            Self {
                fail_reads: AtomicBool::new(true),
            }
        }

        /// Let reads through so only writes fail
        pub fn with_readable_store(self) -> Self {
            self.fail_reads.store(false, Ordering::SeqCst);
            self
        }
    }

    #[async_trait]
    impl ApiKeyRepository for FailingApiKeyRepository {
        async fn get(&self, _key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(DomainError::persistence("get api key", "database is locked"));
            }
            Ok(None)
        }

        async fn insert(&self, _record: ApiKeyRecord) -> Result<(), DomainError> {
            Err(DomainError::persistence("insert api key", "disk I/O error"))
        }

        async fn count(&self) -> Result<usize, DomainError> {
            Err(DomainError::persistence("count api keys", "database is locked"))
        }
    }

    /// Repository that never sees a key yet loses every insert race
    #[derive(Debug, Default)]
    pub struct RacingApiKeyRepository;

    #[async_trait]
    impl ApiKeyRepository for RacingApiKeyRepository {
        async fn get(&self, _key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
            Ok(None)
        }

        async fn insert(&self, record: ApiKeyRecord) -> Result<(), DomainError> {
            Err(DomainError::duplicate_key(record.key()))
        }

        async fn count(&self) -> Result<usize, DomainError> {
            Ok(1)
        }
    }
}
