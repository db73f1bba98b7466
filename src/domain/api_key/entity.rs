//! API key record and admission types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_api_key, validate_owner, ApiKeyValidationError};

/// A registered API key and the identity that owns it
///
/// Records are immutable once created. The key is the primary identity and is
/// unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    key: String,
    owner: String,
    /// Unknown for keys registered before creation times were stored
    created_at: Option<DateTime<Utc>>,
}

impl ApiKeyRecord {
    /// Create a new record after validating both fields
    pub fn new(
        owner: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, ApiKeyValidationError> {
        let owner = owner.into();
        let key = key.into();

        validate_owner(&owner)?;
        validate_api_key(&key)?;

        Ok(Self {
            key,
            owner,
            created_at: Some(Utc::now()),
        })
    }

    /// Rebuild a record loaded from storage
    pub fn from_parts(key: String, owner: String, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            key,
            owner,
            created_at,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Rate limit settings shared by every key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Steady-state requests admitted per trailing 60s window
    pub requests_per_minute: u32,
    /// Hard ceiling per window; `burst_limit - requests_per_minute` extra
    /// requests are tolerated as burst
    pub burst_limit: u32,
}

impl RateLimitConfig {
    pub fn new(requests_per_minute: u32, burst_limit: u32) -> Self {
        Self {
            enabled: true,
            requests_per_minute,
            burst_limit,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            requests_per_minute: 0,
            burst_limit: 0,
        }
    }

    /// Extra admissions tolerated above the steady-state rate
    pub fn burst_allowance(&self) -> u32 {
        self.burst_limit.saturating_sub(self.requests_per_minute)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(60, 60)
    }
}

/// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Under the steady-state rate
    Allowed,
    /// Admitted out of the burst allowance
    AllowedBurst,
    /// Over the burst ceiling; nothing was recorded
    Throttled { retry_after_secs: u64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Throttled { .. })
    }

    /// Label used for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::AllowedBurst => "burst",
            Self::Throttled { .. } => "throttled",
        }
    }
}

impl std::fmt::Display for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Window position of a key right after an admission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Hard ceiling for the window (the burst limit)
    pub limit: u32,
    /// Admissions left before throttling starts
    pub remaining: u32,
    /// Seconds until the oldest request leaves the window
    pub reset_in_seconds: u64,
}

/// Identity attached to a request that passed the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedRequest {
    pub key: String,
    /// `None` when key authentication is disabled
    pub owner: Option<String>,
    pub admission: Admission,
    /// `None` when rate limiting is disabled
    pub rate_limit: Option<RateLimitStatus>,
}

/// Result of an administrative provisioning request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Added { key: String },
    AlreadyExists { key: String },
}

impl ProvisionOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::AlreadyExists { .. } => "already_exists",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Added { key } | Self::AlreadyExists { key } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = ApiKeyRecord::new("alice", "sk-alice-1").unwrap();

        assert_eq!(record.owner(), "alice");
        assert_eq!(record.key(), "sk-alice-1");
        assert!(record.created_at().is_some_and(|t| t <= Utc::now()));
    }

    #[test]
    fn test_record_rejects_invalid_input() {
        assert!(ApiKeyRecord::new("", "sk-1").is_err());
        assert!(ApiKeyRecord::new("alice", "").is_err());
        assert!(ApiKeyRecord::new("alice", "sk 1").is_err());
    }

    #[test]
    fn test_burst_allowance() {
        assert_eq!(RateLimitConfig::new(5, 8).burst_allowance(), 3);
        assert_eq!(RateLimitConfig::new(5, 5).burst_allowance(), 0);
    }

    #[test]
    fn test_admission_labels() {
        assert!(Admission::Allowed.is_allowed());
        assert!(Admission::AllowedBurst.is_allowed());
        assert!(!Admission::Throttled { retry_after_secs: 3 }.is_allowed());
        assert_eq!(Admission::AllowedBurst.to_string(), "burst");
    }

    #[test]
    fn test_provision_outcome_status() {
        let added = ProvisionOutcome::Added { key: "k1".into() };
        let existing = ProvisionOutcome::AlreadyExists { key: "k1".into() };

        assert_eq!(added.status(), "added");
        assert_eq!(existing.status(), "already_exists");
        assert_eq!(existing.key(), "k1");
    }
}
