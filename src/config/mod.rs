//! Typed gateway configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, ConfigError, LogFormat, LoggingConfig, MetricsConfig,
    ModelServerConfig, RateLimitSettings, ServerConfig, DEFAULT_CONFIG_PATH,
};
