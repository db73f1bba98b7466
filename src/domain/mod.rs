//! Domain layer - Core admission types and collaborator traits

pub mod api_key;
pub mod error;
pub mod generation;

pub use api_key::{
    Admission, ApiKeyRecord, ApiKeyRepository, ApiKeyValidationError, AuthorizedRequest,
    ProvisionOutcome, RateLimitConfig, RateLimitStatus,
};
pub use error::{key_hint, DomainError};
pub use generation::{
    DialogueMessage, GenerateRequest, GenerationBackend, GenerationStream,
};
