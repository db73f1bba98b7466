//! ShareLM gateway
//!
//! Request admission in front of a shared model server:
//! - API key verification against a SQLite-backed key store
//! - Per-key sliding window rate limiting with a burst allowance
//! - Admin-secret guarded key provisioning

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::GenerationBackend;
use infrastructure::{
    api_key::{AccessGateway, AdminAuthority, KeyStore, RateLimiter, SqliteApiKeyRepository},
    generation::ModelServerClient,
};
use tracing::info;

/// Open the configured key store
pub async fn open_key_store(config: &AppConfig) -> anyhow::Result<KeyStore> {
    info!(database = %config.auth.database_path, "Opening API key store");

    let repository = SqliteApiKeyRepository::connect(&config.auth.database_path).await?;

    Ok(KeyStore::new(Arc::new(repository)).with_auth_enabled(config.auth.enabled))
}

/// Create the application state from a validated configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let key_store = open_key_store(config).await?;

    let rate_limiter = if config.rate_limit.enabled {
        RateLimiter::new(config.rate_limit_config())
    } else {
        info!("Rate limiting disabled");
        RateLimiter::disabled()
    };

    let gateway = AccessGateway::new(
        key_store,
        Arc::new(rate_limiter),
        AdminAuthority::new(config.auth.admin_key.clone()),
    );

    let backend: Arc<dyn GenerationBackend> =
        Arc::new(ModelServerClient::from_config(&config.model_server)?);

    info!(model_server = %config.model_server.url, "Forwarding generations to model server");

    Ok(AppState::new(Arc::new(gateway), backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::api_key::IN_MEMORY_DATABASE;

    fn in_memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.database_path = IN_MEMORY_DATABASE.to_string();
        config.auth.admin_key = "admin-secret".to_string();
        config
    }

    #[tokio::test]
    async fn test_create_app_state() {
        let state = create_app_state(&in_memory_config()).await.unwrap();

        assert!(state.gateway.key_store().is_auth_enabled());
        assert_eq!(state.gateway.key_store().count().await.unwrap(), 0);
        assert_eq!(state.gateway.rate_limiter().config().requests_per_minute, 60);
    }

    #[tokio::test]
    async fn test_create_app_state_respects_disabled_auth() {
        let mut config = in_memory_config();
        config.auth.enabled = false;
        config.rate_limit.enabled = false;

        let state = create_app_state(&config).await.unwrap();

        assert!(!state.gateway.key_store().is_auth_enabled());
        assert!(!state.gateway.rate_limiter().config().enabled);
    }
}
