//! Video generation handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use babi_models::{GenerationRequest, GenerationResult, RequestError};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::security::log_preview;
use crate::state::AppState;

/// 401 message for the generation endpoint.
pub const GENERATE_UNAUTHORIZED: &str = "Unauthorized. Please sign in to generate videos.";

/// 500 message for any generation failure.
pub const GENERATE_FAILED: &str = "Failed to generate video. Please try again.";

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub video: GenerationResult,
}

/// Generate a (simulated) video.
///
/// The body is parsed only after authentication, so an anonymous caller
/// always gets 401 and a malformed body from a signed-in caller is a
/// generation failure.
pub async fn generate_video(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    body: Bytes,
) -> ApiResult<Json<GenerateResponse>> {
    let user = auth.map_err(|_| ApiError::unauthorized(GENERATE_UNAUTHORIZED))?;
    let user_id = &user.identity.id;

    let tier = state.entitlements.resolve(user_id).await;

    let request: GenerationRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(user_id = %user_id, error = %e, "Malformed generation request");
        metrics::record_generation("unknown", "failed");
        ApiError::internal(GENERATE_FAILED)
    })?;

    let model_label = request
        .model
        .as_deref()
        .and_then(babi_models::GenerationModel::parse)
        .map(|m| m.as_str())
        .unwrap_or("other");

    let validated = request.validate(tier).map_err(|e: RequestError| {
        let outcome = if e.is_authorization() { "forbidden" } else { "invalid" };
        info!(user_id = %user_id, tier = %tier, reason = %e, "Generation request rejected");
        metrics::record_generation(model_label, outcome);
        ApiError::from(e)
    })?;

    info!(
        user_id = %user_id,
        tier = %tier,
        model = validated.known_model().map(|m| m.display_name()).unwrap_or("unrecognised"),
        aspect_ratio = validated.known_aspect_ratio().map(|a| a.as_str()).unwrap_or("unrecognised"),
        remove_watermark = validated.remove_watermark,
        prompt = %log_preview(&validated.prompt),
        "Generating video"
    );

    let video = state.generator.generate(validated, tier).await.map_err(|e| {
        warn!(user_id = %user_id, error = %e, "Video generation failed");
        metrics::record_generation(model_label, "failed");
        ApiError::internal(GENERATE_FAILED)
    })?;

    metrics::record_generation(model_label, "succeeded");
    Ok(Json(GenerateResponse {
        success: true,
        video,
    }))
}
