//! Key store service
//!
//! Registry of valid API keys on top of an `ApiKeyRepository`, with the
//! global authentication bypass applied.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::api_key::{
    validate_api_key, validate_owner, ApiKeyRecord, ApiKeyRepository, ProvisionOutcome,
};
use crate::domain::{key_hint, DomainError};

use super::generator::ApiKeyGenerator;

/// Durable registry of API keys and their owners
#[derive(Debug, Clone)]
pub struct KeyStore {
    repository: Arc<dyn ApiKeyRepository>,
    auth_enabled: bool,
}

impl KeyStore {
    /// Create a key store with key authentication enabled
    pub fn new(repository: Arc<dyn ApiKeyRepository>) -> Self {
        Self {
            repository,
            auth_enabled: true,
        }
    }

    /// Toggle key authentication; when disabled every key verifies
    pub fn with_auth_enabled(mut self, enabled: bool) -> Self {
        self.auth_enabled = enabled;
        self
    }

    pub fn is_auth_enabled(&self) -> bool {
        self.auth_enabled
    }

    /// Whether `key` may be used, honouring the authentication bypass
    pub async fn verify(&self, key: &str) -> Result<bool, DomainError> {
        if !self.auth_enabled {
            return Ok(true);
        }

        self.contains(key).await
    }

    /// Whether `key` is registered, ignoring the authentication bypass
    pub async fn contains(&self, key: &str) -> Result<bool, DomainError> {
        self.repository
            .exists(key)
            .await
            .inspect_err(|e| log_persistence_error("verify", key, e))
    }

    /// Fetch the record registered for `key`
    pub async fn lookup(&self, key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.repository
            .get(key)
            .await
            .inspect_err(|e| log_persistence_error("lookup", key, e))
    }

    /// Register `key` for `owner`
    ///
    /// Fails with `DomainError::DuplicateKey` when the key is already taken,
    /// including when a concurrent insert won the race.
    pub async fn add(&self, owner: &str, key: &str) -> Result<(), DomainError> {
        let record = ApiKeyRecord::new(owner, key)?;

        match self.repository.insert(record).await {
            Ok(()) => {
                info!(owner = %owner, key = %key_hint(key), "Added new API key");
                Ok(())
            }
            Err(e @ DomainError::DuplicateKey { .. }) => {
                warn!(owner = %owner, key = %key_hint(key), "Attempted to add duplicate API key");
                Err(e)
            }
            Err(e) => {
                log_persistence_error("add", key, &e);
                Err(e)
            }
        }
    }

    /// Register a key for `owner`, generating one with `generator` when `key`
    /// is absent or blank
    ///
    /// A key that already exists, or that a concurrent insert registers
    /// first, is reported as `AlreadyExists` rather than as an error.
    pub async fn provision(
        &self,
        owner: &str,
        key: Option<&str>,
        generator: &ApiKeyGenerator,
    ) -> Result<ProvisionOutcome, DomainError> {
        let owner = owner.trim();
        validate_owner(owner)?;

        let key = match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => generator.generate(),
        };
        validate_api_key(&key)?;

        if self.contains(&key).await? {
            info!(owner = %owner, key = %key_hint(&key), "API key already registered");
            return Ok(ProvisionOutcome::AlreadyExists { key });
        }

        match self.add(owner, &key).await {
            Ok(()) => Ok(ProvisionOutcome::Added { key }),
            Err(DomainError::DuplicateKey { .. }) => Ok(ProvisionOutcome::AlreadyExists { key }),
            Err(e) => Err(e),
        }
    }

    /// Number of registered keys
    pub async fn count(&self) -> Result<usize, DomainError> {
        let count = self.repository.count().await?;
        debug!(count, "Counted registered API keys");
        Ok(count)
    }
}

fn log_persistence_error(operation: &str, key: &str, err: &DomainError) {
    if matches!(err, DomainError::Persistence { .. }) {
        error!(
            operation = %operation,
            key = %key_hint(key),
            error = %err,
            "Key store operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::mock::{FailingApiKeyRepository, RacingApiKeyRepository};
    use crate::infrastructure::api_key::InMemoryApiKeyRepository;

    fn create_store() -> KeyStore {
        KeyStore::new(Arc::new(InMemoryApiKeyRepository::new()))
    }

    #[tokio::test]
    async fn test_verify_registered_key() {
        let store = create_store();
        store.add("alice", "sk-alice").await.unwrap();

        assert!(store.verify("sk-alice").await.unwrap());
        assert!(!store.verify("sk-unknown").await.unwrap());
    }

    #[tokio::test]
    async fn test_bypass_mode_verifies_everything() {
        let store = create_store().with_auth_enabled(false);

        assert!(store.verify("").await.unwrap());
        assert!(store.verify("never-issued").await.unwrap());
        assert!(!store.contains("never-issued").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_duplicate_fails_without_mutation() {
        let store = create_store();

        store.add("alice", "sk-1").await.unwrap();
        let result = store.add("bob", "sk-1").await;

        assert!(matches!(result, Err(DomainError::DuplicateKey { .. })));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.lookup("sk-1").await.unwrap().unwrap().owner(), "alice");
    }

    #[tokio::test]
    async fn test_add_sequence_uniqueness() {
        let store = create_store();
        let keys = ["a1", "b2", "a1", "c3", "b2", "a1"];

        let mut added = 0;
        for key in keys {
            if store.add("owner", key).await.is_ok() {
                added += 1;
            }
        }

        assert_eq!(added, 3);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_input() {
        let store = create_store();

        let result = store.add("alice", "has space").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = store.add("", "sk-ok").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_provision_then_already_exists() {
        let store = create_store();
        let generator = ApiKeyGenerator::default();

        let first = store.provision(" alice ", Some(" sk-1 "), &generator).await.unwrap();
        let second = store.provision("bob", Some("sk-1"), &generator).await.unwrap();

        assert_eq!(first, ProvisionOutcome::Added { key: "sk-1".into() });
        assert_eq!(second.status(), "already_exists");
        assert_eq!(store.lookup("sk-1").await.unwrap().unwrap().owner(), "alice");
    }

    #[tokio::test]
    async fn test_provision_generates_blank_key() {
        let store = create_store();

        let outcome = store
            .provision("alice", Some("  "), &ApiKeyGenerator::default())
            .await
            .unwrap();

        assert_eq!(outcome.status(), "added");
        assert!(outcome.key().starts_with("sk-"));
    }

    #[tokio::test]
    async fn test_provision_lost_insert_race_reports_already_exists() {
        let store = KeyStore::new(Arc::new(RacingApiKeyRepository));

        let outcome = store
            .provision("alice", Some("sk-race"), &ApiKeyGenerator::default())
            .await
            .unwrap();

        assert_eq!(outcome, ProvisionOutcome::AlreadyExists { key: "sk-race".into() });
    }

    #[tokio::test]
    async fn test_persistence_errors_surface() {
        let store = KeyStore::new(Arc::new(FailingApiKeyRepository::new()));

        let result = store.verify("sk-1").await;
        assert!(matches!(result, Err(DomainError::Persistence { .. })));

        let result = store.add("alice", "sk-1").await;
        assert!(matches!(result, Err(DomainError::Persistence { .. })));
    }

    #[tokio::test]
    async fn test_bypass_skips_storage() {
        let store =
            KeyStore::new(Arc::new(FailingApiKeyRepository::new())).with_auth_enabled(false);

        assert!(store.verify("anything").await.unwrap());
    }
}
