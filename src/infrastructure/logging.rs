//! Subscriber setup for the gateway binary

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Dependencies that log every query or connection at `info`
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "hyper=warn", "reqwest=warn", "h2=warn"];

/// Filter for the configured level with chatty dependencies held at `warn`
///
/// Directives from `RUST_LOG` replace all of this when set.
pub fn gateway_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    QUIET_TARGETS
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::new(level), EnvFilter::add_directive)
}

/// Install the global subscriber
///
/// Admission decisions log at `debug` (allowed) and `warn` (burst, rejected),
/// so `info` keeps throttling visible without per-request noise.
pub fn init_logging(config: &LoggingConfig) {
    let filter = gateway_filter(&config.level);

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_span_events(FmtSpan::NONE))
            .try_init(),
    };

    match installed {
        Ok(()) => tracing::info!(level = %config.level, format = ?config.format, "Logging initialized"),
        Err(e) => eprintln!("Logging already initialized: {}", e),
    }
}
