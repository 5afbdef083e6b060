//! Video generation request, validation and result models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::plan::PlanTier;

/// Minimum prompt length (in Unicode scalar values, after trimming).
pub const MIN_PROMPT_LENGTH: usize = 10;

/// Maximum prompt length (in characters, after trimming).
pub const MAX_PROMPT_LENGTH: usize = 5000;

/// Maximum number of people that can be featured in one generation.
pub const MAX_SELECTED_PEOPLE: usize = 3;

/// Generation models offered in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenerationModel {
    /// OpenAI Sora 2
    Sora,
    /// Google Veo 3.1
    Veo,
}

impl GenerationModel {
    /// Classify a wire value. Unknown values return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sora" => Some(GenerationModel::Sora),
            "veo" => Some(GenerationModel::Veo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationModel::Sora => "sora",
            GenerationModel::Veo => "veo",
        }
    }

    /// Human-readable model name.
    pub fn display_name(&self) -> &'static str {
        match self {
            GenerationModel::Sora => "Sora 2",
            GenerationModel::Veo => "Veo 3.1",
        }
    }
}

impl fmt::Display for GenerationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output aspect ratios offered in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AspectRatio {
    /// 16:9
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 for TikTok/Reels
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Classify a wire value. Unknown values return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "16:9" => Some(AspectRatio::Landscape),
            "9:16" => Some(AspectRatio::Portrait),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw generation payload as sent by the client.
///
/// `model` and `aspectRatio` are kept as strings and echoed back verbatim;
/// see [`GenerationModel::parse`] and [`AspectRatio::parse`] for the known
/// values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub remove_watermark: Option<bool>,
    #[serde(default)]
    pub generate_from_images: Option<bool>,
    #[serde(default)]
    pub selected_people: Option<Vec<String>>,
    /// Number of reference images attached in the UI.
    #[serde(default)]
    pub images: Option<u32>,
}

/// Rejection produced by [`GenerationRequest::validate`].
///
/// The display strings are the caller-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Prompt is required")]
    PromptRequired,

    #[error("Prompt must be at least 10 characters long")]
    PromptTooShort,

    #[error("Prompt must be at most 5000 characters long")]
    PromptTooLong,

    #[error("You can select at most 3 people")]
    TooManyPeople,

    #[error("Watermark removal is only available for Pro users")]
    ProRequired,
}

impl RequestError {
    /// True when the rejection is about entitlement rather than payload shape.
    pub fn is_authorization(&self) -> bool {
        matches!(self, RequestError::ProRequired)
    }
}

impl GenerationRequest {
    /// Validate the request against the caller's tier.
    ///
    /// Checks, in order:
    /// - prompt present and non-blank
    /// - trimmed prompt length within bounds
    /// - at most three selected people
    /// - watermark removal only for Pro
    pub fn validate(self, tier: PlanTier) -> Result<ValidatedRequest, RequestError> {
        let prompt = match self.prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(RequestError::PromptRequired),
        };

        let trimmed_len = prompt.trim().chars().count();
        if trimmed_len < MIN_PROMPT_LENGTH {
            return Err(RequestError::PromptTooShort);
        }
        if trimmed_len > MAX_PROMPT_LENGTH {
            return Err(RequestError::PromptTooLong);
        }

        let selected_people = self.selected_people.unwrap_or_default();
        if selected_people.len() > MAX_SELECTED_PEOPLE {
            return Err(RequestError::TooManyPeople);
        }

        let remove_watermark = self.remove_watermark.unwrap_or(false);
        if remove_watermark && !tier.is_pro() {
            return Err(RequestError::ProRequired);
        }

        Ok(ValidatedRequest {
            prompt,
            model: self.model,
            aspect_ratio: self.aspect_ratio,
            remove_watermark,
            generate_from_images: self.generate_from_images.unwrap_or(false),
            selected_people,
            image_count: self.images.unwrap_or(0),
        })
    }
}

/// A generation request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Prompt exactly as submitted (echoed back untrimmed).
    pub prompt: String,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
    pub remove_watermark: bool,
    pub generate_from_images: bool,
    pub selected_people: Vec<String>,
    pub image_count: u32,
}

impl ValidatedRequest {
    pub fn known_model(&self) -> Option<GenerationModel> {
        self.model.as_deref().and_then(GenerationModel::parse)
    }

    pub fn known_aspect_ratio(&self) -> Option<AspectRatio> {
        self.aspect_ratio.as_deref().and_then(AspectRatio::parse)
    }

    /// Whether the output carries the watermark for a caller on `tier`.
    pub fn has_watermark(&self, tier: PlanTier) -> bool {
        has_watermark(tier.is_pro(), self.remove_watermark)
    }
}

/// Watermark is absent only when the caller is Pro AND asked for removal.
pub fn has_watermark(is_pro: bool, remove_watermark: bool) -> bool {
    !is_pro || !remove_watermark
}

/// Extra information echoed with a generation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub selected_people: Vec<String>,
    pub from_images: bool,
}

/// Result of a (simulated) video generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub url: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    pub has_watermark: bool,
    #[serde(with = "iso_millis")]
    #[schemars(with = "String")]
    pub generated_at: DateTime<Utc>,
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// Build a result for a validated request.
    pub fn new(
        request: ValidatedRequest,
        url: impl Into<String>,
        tier: PlanTier,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let has_watermark = request.has_watermark(tier);
        Self {
            url: url.into(),
            prompt: request.prompt,
            model: request.model,
            aspect_ratio: request.aspect_ratio,
            has_watermark,
            generated_at,
            metadata: GenerationMetadata {
                selected_people: request.selected_people,
                from_images: request.generate_from_images,
            },
        }
    }
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
