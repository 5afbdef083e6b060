//! Account handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// Permanently delete the caller's account.
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<DeleteAccountResponse>> {
    state
        .accounts
        .delete_account(&user.identity, &user.token)
        .await
        .map_err(|e| {
            error!(user_id = %user.identity.id, error = %e, "Account deletion failed");
            ApiError::internal("Failed to delete user account")
        })?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "Account deleted successfully".to_string(),
    }))
}
