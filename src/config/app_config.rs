use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::RateLimitConfig;

/// Default location of the gateway configuration file (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "configs/api_config";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub model_server: ModelServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

/// Where generation requests are forwarded once admitted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelServerConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// When false every API key verifies as valid
    pub enabled: bool,
    /// SQLite file holding the key registry, or `:memory:`
    pub database_path: String,
    /// Shared secret for administrative endpoints
    pub admin_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub requests_per_minute: u32,
    pub burst_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl Default for ModelServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: "api_keys.db".to_string(),
            admin_key: String::new(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 60,
            burst_limit: 100,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        if !settings.enabled {
            return RateLimitConfig::disabled();
        }
        RateLimitConfig::new(settings.requests_per_minute, settings.burst_limit)
    }
}

impl AppConfig {
    /// Load from the default config file (if present) and `APP__*` env vars
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit config file, which then must exist
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Reject settings that would only fail later at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate_limit = &self.rate_limit;

        if rate_limit.enabled {
            if rate_limit.requests_per_minute == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.requests_per_minute must be greater than 0".to_string(),
                ));
            }

            if rate_limit.burst_limit < rate_limit.requests_per_minute {
                return Err(ConfigError::Invalid(format!(
                    "rate_limit.burst_limit ({}) must be >= rate_limit.requests_per_minute ({})",
                    rate_limit.burst_limit, rate_limit.requests_per_minute
                )));
            }
        }

        if self.auth.database_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.database_path cannot be empty".to_string(),
            ));
        }

        if self.model_server.url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "model_server.url cannot be empty".to_string(),
            ));
        }

        if self.model_server.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "model_server.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::from(&self.rate_limit)
    }
}
