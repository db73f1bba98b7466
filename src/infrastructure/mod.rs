//! Infrastructure layer - Persistence, rate limiting and external services

pub mod api_key;
pub mod generation;
pub mod logging;
pub mod observability;
