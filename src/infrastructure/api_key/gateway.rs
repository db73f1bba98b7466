//! Access gateway
//!
//! Runs every inbound request through the admission steps in a fixed order,
//! stopping at the first failure:
//!
//! 1. credential presence (`MissingCredential`)
//! 2. credential validity against the key store (`InvalidCredential`)
//! 3. rate admission (`RateLimitExceeded`)
//!
//! Administrative operations instead require an [`AdminGrant`], which only
//! [`AccessGateway::authorize_admin`] can hand out.

use std::sync::Arc;

use tracing::warn;

use crate::domain::api_key::{Admission, AuthorizedRequest, ProvisionOutcome};
use crate::domain::{key_hint, DomainError};
use crate::infrastructure::observability::{record_admission, record_provisioning};

use super::admin::AdminAuthority;
use super::generator::ApiKeyGenerator;
use super::key_store::KeyStore;
use super::rate_limiter::RateLimiter;

/// Rate limit bucket shared by callers without a key while authentication is
/// disabled
pub const ANONYMOUS_KEY: &str = "anonymous";

/// Proof that the admin secret was checked for the current request
#[derive(Debug)]
pub struct AdminGrant {
    _private: (),
}

/// Orchestrates key store, rate limiter and admin authority per request
#[derive(Debug, Clone)]
pub struct AccessGateway {
    key_store: KeyStore,
    rate_limiter: Arc<RateLimiter>,
    admin: AdminAuthority,
    generator: ApiKeyGenerator,
}

impl AccessGateway {
    pub fn new(key_store: KeyStore, rate_limiter: Arc<RateLimiter>, admin: AdminAuthority) -> Self {
        Self {
            key_store,
            rate_limiter,
            admin,
            generator: ApiKeyGenerator::default(),
        }
    }

    /// Use a custom generator for keys created without an explicit value
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.key_store
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Admit a request carrying `api_key` (the raw `X-API-Key` value)
    ///
    /// The value is used exactly as sent. Only an absent or empty header
    /// counts as missing; anything else is checked against the key store.
    pub async fn authorize(&self, api_key: Option<&str>) -> Result<AuthorizedRequest, DomainError> {
        let auth_enabled = self.key_store.is_auth_enabled();

        let key = match api_key.filter(|k| !k.is_empty()) {
            Some(key) => key,
            None if !auth_enabled => ANONYMOUS_KEY,
            None => {
                warn!("API key is missing");
                record_admission("missing_credential");
                return Err(DomainError::MissingCredential);
            }
        };

        let verified = self.key_store.verify(key).await.inspect_err(|_| {
            record_admission("persistence_error");
        })?;

        if !verified {
            warn!(key = %key_hint(key), "Invalid API key");
            record_admission("invalid_credential");
            return Err(DomainError::InvalidCredential);
        }

        let owner = self.resolve_owner(key).await.inspect_err(|_| {
            record_admission("persistence_error");
        })?;

        // Key store I/O is finished before the limiter's per-key lock is taken
        let result = self.rate_limiter.admit(key).await;
        record_admission(result.admission.as_str());

        if let Admission::Throttled { retry_after_secs } = result.admission {
            return Err(DomainError::rate_limited(retry_after_secs));
        }

        Ok(AuthorizedRequest {
            key: key.to_string(),
            owner,
            admission: result.admission,
            rate_limit: self.rate_limiter.config().enabled.then(|| result.status()),
        })
    }

    /// Owner of a verified key; unknown while authentication is bypassed
    async fn resolve_owner(&self, key: &str) -> Result<Option<String>, DomainError> {
        if !self.key_store.is_auth_enabled() {
            return Ok(None);
        }

        let record = self.key_store.lookup(key).await?;
        Ok(record.map(|r| r.owner().to_string()))
    }

    /// Check the `X-Admin-Key` value
    pub fn authorize_admin(&self, admin_secret: Option<&str>) -> Result<AdminGrant, DomainError> {
        let Some(secret) = admin_secret.filter(|s| !s.is_empty()) else {
            warn!("Admin key is missing");
            return Err(DomainError::MissingAdminSecret);
        };

        if !self.admin.validate(secret) {
            warn!("Invalid admin key");
            return Err(DomainError::InvalidAdminSecret);
        }

        Ok(AdminGrant { _private: () })
    }

    /// Register a key for `owner`, generating one when `key` is absent
    pub async fn provision(
        &self,
        _grant: &AdminGrant,
        owner: &str,
        key: Option<&str>,
    ) -> Result<ProvisionOutcome, DomainError> {
        let outcome = self
            .key_store
            .provision(owner, key, &self.generator)
            .await
            .inspect_err(|e| {
                if matches!(e, DomainError::Persistence { .. }) {
                    record_provisioning("error");
                }
            })?;

        record_provisioning(outcome.status());
        Ok(outcome)
    }

    /// Clear the rate limit window of `key`
    pub async fn reset_rate_limit(&self, _grant: &AdminGrant, key: &str) {
        self.rate_limiter.reset(key).await;
    }
}
