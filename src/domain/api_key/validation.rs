//! API key and owner validation utilities

use thiserror::Error;

/// Errors that can occur while validating provisioning input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key cannot be empty")]
    EmptyKey,

    #[error("Owner cannot be empty")]
    EmptyOwner,

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("API key contains invalid character: {0:?}. Whitespace and control characters are not allowed")]
    InvalidCharacter(char),

    #[error("Owner contains a control character")]
    ControlCharacterInOwner,
}

pub const MAX_API_KEY_LENGTH: usize = 256;
pub const MAX_OWNER_LENGTH: usize = 256;

/// Validate an API key
///
/// Rules:
/// - Cannot be empty
/// - Maximum 256 characters
/// - No whitespace or control characters
pub fn validate_api_key(key: &str) -> Result<(), ApiKeyValidationError> {
    if key.is_empty() {
        return Err(ApiKeyValidationError::EmptyKey);
    }

    if key.chars().count() > MAX_API_KEY_LENGTH {
        return Err(ApiKeyValidationError::TooLong {
            field: "API key",
            max: MAX_API_KEY_LENGTH,
        });
    }

    if let Some(c) = key.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(ApiKeyValidationError::InvalidCharacter(c));
    }

    Ok(())
}

/// Validate an owner identity
pub fn validate_owner(owner: &str) -> Result<(), ApiKeyValidationError> {
    if owner.trim().is_empty() {
        return Err(ApiKeyValidationError::EmptyOwner);
    }

    if owner.chars().count() > MAX_OWNER_LENGTH {
        return Err(ApiKeyValidationError::TooLong {
            field: "Owner",
            max: MAX_OWNER_LENGTH,
        });
    }

    if owner.chars().any(char::is_control) {
        return Err(ApiKeyValidationError::ControlCharacterInOwner);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(validate_api_key("sk-abc123").is_ok());
        assert!(validate_api_key("a").is_ok());
        assert!(validate_api_key("key_with.symbols~!").is_ok());
        assert!(validate_api_key(&"k".repeat(MAX_API_KEY_LENGTH)).is_ok());
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(validate_api_key(""), Err(ApiKeyValidationError::EmptyKey));
    }

    #[test]
    fn test_key_too_long() {
        let key = "k".repeat(MAX_API_KEY_LENGTH + 1);
        assert!(matches!(
            validate_api_key(&key),
            Err(ApiKeyValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_key_with_whitespace() {
        assert_eq!(
            validate_api_key("sk abc"),
            Err(ApiKeyValidationError::InvalidCharacter(' '))
        );
        assert_eq!(
            validate_api_key("sk\tabc"),
            Err(ApiKeyValidationError::InvalidCharacter('\t'))
        );
    }

    #[test]
    fn test_valid_owners() {
        assert!(validate_owner("alice").is_ok());
        assert!(validate_owner("Research Team 7").is_ok());
    }

    #[test]
    fn test_invalid_owners() {
        assert_eq!(validate_owner(""), Err(ApiKeyValidationError::EmptyOwner));
        assert_eq!(validate_owner("   "), Err(ApiKeyValidationError::EmptyOwner));
        assert_eq!(
            validate_owner("bob\n"),
            Err(ApiKeyValidationError::ControlCharacterInOwner)
        );
    }
}
