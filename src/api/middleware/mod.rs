//! API middleware components

pub mod admin_auth;
pub mod auth;
pub mod logging;
pub mod metrics;

pub use admin_auth::RequireAdmin;
pub use auth::{rate_limit_headers, RequireApiKey, API_KEY_HEADER};
pub use admin_auth::ADMIN_KEY_HEADER;
pub use logging::{logging_middleware, REQUEST_ID_HEADER};
pub use metrics::metrics_middleware;
