//! API key infrastructure - key store, rate limiting and request admission

mod admin;
mod gateway;
mod generator;
mod key_store;
mod rate_limiter;
mod repository;
mod sqlite_repository;

pub use admin::AdminAuthority;
pub use gateway::{AccessGateway, AdminGrant, ANONYMOUS_KEY};
pub use generator::ApiKeyGenerator;
pub use key_store::KeyStore;
pub use rate_limiter::{RateLimitResult, RateLimiter, WINDOW};
pub use repository::InMemoryApiKeyRepository;
pub use sqlite_repository::{SqliteApiKeyRepository, IN_MEMORY_DATABASE};
