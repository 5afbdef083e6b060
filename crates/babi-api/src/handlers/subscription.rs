//! Subscription handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use babi_models::PlanTier;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::security::is_valid_plan_id;
use crate::services::subscription::DEFAULT_CHECKOUT_PLAN;
use crate::services::SubscriptionError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub tier: PlanTier,
    pub is_pro: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionChangeResponse {
    pub success: bool,
    pub tier: PlanTier,
}

/// Current tier of the caller.
pub async fn get_subscription(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<SubscriptionResponse>> {
    let tier = state.entitlements.resolve(&user.identity.id).await;
    Ok(Json(SubscriptionResponse {
        tier,
        is_pro: tier.is_pro(),
    }))
}

/// Subscribe the caller to a plan (payment simulated).
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> ApiResult<Json<SubscriptionChangeResponse>> {
    let request: CheckoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CheckoutRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            debug!(error = %e, "Malformed checkout request");
            ApiError::bad_request("Invalid request body")
        })?
    };
    let plan = request
        .plan
        .unwrap_or_else(|| DEFAULT_CHECKOUT_PLAN.to_string());

    if !is_valid_plan_id(&plan) {
        return Err(ApiError::bad_request("Unknown plan"));
    }

    let tier = state
        .subscriptions
        .checkout(&user.identity.id, &plan)
        .await
        .map_err(|e| match e {
            SubscriptionError::UnknownPlan(_) => ApiError::bad_request("Unknown plan"),
            SubscriptionError::Store(e) => {
                error!(user_id = %user.identity.id, error = %e, "Checkout failed");
                ApiError::internal("Failed to process subscription. Please try again.")
            }
        })?;

    Ok(Json(SubscriptionChangeResponse {
        success: true,
        tier,
    }))
}

/// Return the caller to the free tier.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<SubscriptionChangeResponse>> {
    let tier = state
        .subscriptions
        .cancel(&user.identity.id)
        .await
        .map_err(|e| {
            error!(user_id = %user.identity.id, error = %e, "Cancellation failed");
            ApiError::internal("Failed to cancel subscription. Please try again.")
        })?;

    Ok(Json(SubscriptionChangeResponse {
        success: true,
        tier,
    }))
}
