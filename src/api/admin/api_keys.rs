//! API key provisioning and rate limit administration

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{key_hint, DomainError};

/// Query parameters of `POST /add_api_key`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddApiKeyParams {
    #[serde(default, alias = "user_id")]
    pub owner: Option<String>,
    #[serde(default, alias = "api_key")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddApiKeyResponse {
    pub status: String,
    pub key: String,
}

/// Query parameters of `POST /reset_rate_limit`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetRateLimitParams {
    #[serde(default, alias = "api_key")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// POST /add_api_key
pub async fn add_api_key(
    State(state): State<AppState>,
    RequireAdmin(grant): RequireAdmin,
    Query(params): Query<AddApiKeyParams>,
) -> Result<Json<AddApiKeyResponse>, ApiError> {
    let owner = params
        .owner
        .ok_or_else(|| DomainError::validation("owner is required"))?;

    let outcome = state
        .gateway
        .provision(&grant, &owner, params.key.as_deref())
        .await?;

    Ok(Json(AddApiKeyResponse {
        status: outcome.status().to_string(),
        key: outcome.key().to_string(),
    }))
}

/// POST /reset_rate_limit
pub async fn reset_rate_limit(
    State(state): State<AppState>,
    RequireAdmin(grant): RequireAdmin,
    Query(params): Query<ResetRateLimitParams>,
) -> Result<Json<StatusResponse>, ApiError> {
    let key = params
        .key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| DomainError::validation("key is required"))?;

    state.gateway.reset_rate_limit(&grant, key.trim()).await;
    info!(key = %key_hint(&key), "Rate limit reset");

    Ok(Json(StatusResponse {
        status: "reset".to_string(),
    }))
}
