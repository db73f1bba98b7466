use thiserror::Error;

use super::api_key::ApiKeyValidationError;

/// Core domain errors
///
/// Every admission failure is its own variant so the HTTP layer can map each
/// one to exactly one stable status.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("API key is missing")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidCredential,

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Admin key is missing")]
    MissingAdminSecret,

    #[error("Invalid admin key")]
    InvalidAdminSecret,

    #[error("API key already exists: {key_hint}")]
    DuplicateKey { key_hint: String },

    #[error("Persistence error during {operation}: {message}")]
    Persistence { operation: String, message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String },
}

impl DomainError {
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimitExceeded { retry_after_secs }
    }

    pub fn duplicate_key(key: &str) -> Self {
        Self::DuplicateKey {
            key_hint: key_hint(key),
        }
    }

    pub fn persistence(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

impl From<ApiKeyValidationError> for DomainError {
    fn from(err: ApiKeyValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

/// Shortened form of an API key that is safe to put in logs and errors
pub fn key_hint(key: &str) -> String {
    const VISIBLE: usize = 4;

    if key.chars().count() <= VISIBLE {
        return "****".to_string();
    }

    let visible: String = key.chars().take(VISIBLE).collect();
    format!("{}****", visible)
}
