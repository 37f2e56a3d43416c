//! Upstream token exchange.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use clientdesk_core::TokenExchangeResponse;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MicrosoftAuthRequest {
    pub token: String,
}

/// POST /api/auth/microsoft — exchange an upstream (mocked) token for a
/// session token. Unauthenticated by design.
pub async fn microsoft_auth(
    State(state): State<AppState>,
    Json(req): Json<MicrosoftAuthRequest>,
) -> Result<Json<TokenExchangeResponse>, ApiError> {
    let resp = state.auth.exchange(&req.token).map_err(ApiError::from)?;
    Ok(Json(resp))
}
