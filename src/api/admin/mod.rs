//! Administrative endpoints guarded by the admin secret

pub mod api_keys;

pub use api_keys::{add_api_key, reset_rate_limit};
