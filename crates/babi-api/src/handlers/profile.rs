//! Profile handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use babi_models::{PlanTier, UserId};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: Option<String>,
    pub tier: PlanTier,
    pub is_pro: bool,
}

/// Who the caller is and which tier they are on.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let tier = state.entitlements.resolve(&user.identity.id).await;

    Ok(Json(ProfileResponse {
        id: user.identity.id,
        email: user.identity.email,
        tier,
        is_pro: tier.is_pro(),
    }))
}
