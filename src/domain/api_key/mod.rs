//! API key domain module

mod entity;
mod repository;
mod validation;

pub use entity::{
    Admission, ApiKeyRecord, AuthorizedRequest, ProvisionOutcome, RateLimitConfig,
    RateLimitStatus,
};
#[cfg(test)]
pub use repository::mock;
pub use repository::ApiKeyRepository;
pub use validation::{validate_api_key, validate_owner, ApiKeyValidationError};
