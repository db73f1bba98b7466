//! Generation endpoints forwarded to the model server

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::middleware::{rate_limit_headers, RequireApiKey};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::GenerateRequest;

/// POST /generate
pub async fn generate(
    State(state): State<AppState>,
    RequireApiKey(authorized): RequireApiKey,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    debug!(
        owner = authorized.owner.as_deref().unwrap_or("-"),
        admission = %authorized.admission,
        "Forwarding generate request"
    );

    let result = state.backend.generate(&request).await?;
    Ok((rate_limit_headers(&authorized), Json(result)).into_response())
}

/// POST /generate_stream
///
/// Model server bytes are relayed as they arrive.
pub async fn generate_stream(
    State(state): State<AppState>,
    RequireApiKey(authorized): RequireApiKey,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    debug!(
        owner = authorized.owner.as_deref().unwrap_or("-"),
        admission = %authorized.admission,
        "Forwarding streaming generate request"
    );

    let stream = state.backend.generate_stream(&request).await?;

    Ok((
        StatusCode::OK,
        rate_limit_headers(&authorized),
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}
