use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::admin;
use super::generate;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Generation, admitted through the gateway
        .route("/generate", post(generate::generate))
        .route("/generate_stream", post(generate::generate_stream))
        // Admin endpoints, guarded by the admin secret
        .route("/add_api_key", post(admin::add_api_key))
        .route("/reset_rate_limit", post(admin::reset_rate_limit))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}
