//! Admin secret extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::api_key::AdminGrant;

use super::auth::header_value;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Extractor that requires the administrative secret in `X-Admin-Key`
#[derive(Debug)]
pub struct RequireAdmin(pub AdminGrant);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = header_value(&parts.headers, ADMIN_KEY_HEADER)?;
        let grant = state.gateway.authorize_admin(secret)?;

        debug!("Admin access granted");
        Ok(RequireAdmin(grant))
    }
}
