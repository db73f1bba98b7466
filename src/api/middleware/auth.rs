//! API key admission extractor

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue},
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::AuthorizedRequest;

pub const API_KEY_HEADER: &str = "x-api-key";

pub const RATE_LIMIT_LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const RATE_LIMIT_REMAINING_HEADER: HeaderName =
    HeaderName::from_static("x-ratelimit-remaining");
pub const RATE_LIMIT_RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Extractor that runs the request through the access gateway
///
/// Rejects with 400 when `X-API-Key` is absent, 403 when the key is unknown
/// and 429 when the key is over its rate limit.
#[derive(Debug, Clone)]
pub struct RequireApiKey(pub AuthorizedRequest);

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = header_value(&parts.headers, API_KEY_HEADER)?;
        let authorized = state.gateway.authorize(api_key).await?;

        Ok(RequireApiKey(authorized))
    }
}

/// `X-RateLimit-*` headers describing the caller's window after admission
///
/// Empty when rate limiting is disabled.
pub fn rate_limit_headers(authorized: &AuthorizedRequest) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(status) = authorized.rate_limit {
        headers.insert(RATE_LIMIT_LIMIT_HEADER, HeaderValue::from(status.limit));
        headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(status.remaining));
        headers.insert(RATE_LIMIT_RESET_HEADER, HeaderValue::from(status.reset_in_seconds));
    }
    headers
}

/// Non UTF-8 values are rejected rather than treated as missing
pub(crate) fn header_value<'a>(
    headers: &'a HeaderMap,
    name: &str,
) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| {
                ApiError::bad_request(format!("Invalid {} header encoding", name))
                    .with_code("invalid_header")
            })
        })
        .transpose()
}
