//! Generation proxy.
//!
//! Stands in for a real media-synthesis backend: waits a fixed latency and
//! returns a canned sample video for the requested aspect ratio.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use babi_models::{AspectRatio, GenerationResult, PlanTier, ValidatedRequest};

/// Sample video returned for landscape requests.
pub const LANDSCAPE_SAMPLE_URL: &str =
    "https://interactive-examples.mdn.mozilla.net/media/cc0-videos/flower.mp4";

/// Sample video returned for every other aspect ratio.
pub const PORTRAIT_SAMPLE_URL: &str =
    "https://babiceva.ai/video-examples/sora2-example.mp4?v=1768570150847";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation backend failed: {0}")]
    Backend(String),
}

/// A media-synthesis backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        request: ValidatedRequest,
        tier: PlanTier,
    ) -> Result<GenerationResult, GenerationError>;
}

/// Fixed-latency stand-in producing canned results.
#[derive(Debug, Clone)]
pub struct SimulatedGenerator {
    latency: Duration,
}

impl SimulatedGenerator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Canned URL for an aspect ratio as submitted.
    pub fn sample_url(aspect_ratio: Option<&str>) -> &'static str {
        match aspect_ratio.and_then(AspectRatio::parse) {
            Some(AspectRatio::Landscape) => LANDSCAPE_SAMPLE_URL,
            _ => PORTRAIT_SAMPLE_URL,
        }
    }
}

#[async_trait]
impl GenerationBackend for SimulatedGenerator {
    async fn generate(
        &self,
        request: ValidatedRequest,
        tier: PlanTier,
    ) -> Result<GenerationResult, GenerationError> {
        debug!(latency_ms = self.latency.as_millis() as u64, "Simulating generation");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let url = Self::sample_url(request.aspect_ratio.as_deref());
        let result = GenerationResult::new(request, url, tier, Utc::now());

        info!(
            model = result.model.as_deref().unwrap_or("unspecified"),
            aspect_ratio = result.aspect_ratio.as_deref().unwrap_or("unspecified"),
            has_watermark = result.has_watermark,
            "Generated sample video"
        );

        Ok(result)
    }
}
