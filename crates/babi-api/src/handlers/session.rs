//! Session handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::BearerToken;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub success: bool,
}

/// End the caller's session. Succeeds without a session too.
pub async fn sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<SignOutResponse>> {
    state
        .providers
        .sessions
        .sign_out(token.as_deref())
        .await
        .map_err(|e| {
            warn!(error = %e, "Sign-out failed");
            ApiError::internal(e.to_string())
        })?;

    info!(had_session = token.is_some(), "Signed out");
    Ok(Json(SignOutResponse { success: true }))
}
