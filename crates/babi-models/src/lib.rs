//! Shared data models for the Babiceva AI backend.
//!
//! This crate provides Serde-serializable types for:
//! - Authenticated identities and subscription tiers
//! - Video generation requests, validation and results
//! - Plan and tool catalogs shown on the marketing pages

pub mod catalog;
pub mod generation;
pub mod identity;
pub mod plan;

// Re-export common types
pub use catalog::{PlanCatalog, PlanOffer, ToolInfo, ToolKind};
pub use generation::{
    AspectRatio, GenerationMetadata, GenerationModel, GenerationRequest, GenerationResult,
    RequestError, ValidatedRequest, MAX_PROMPT_LENGTH, MAX_SELECTED_PEOPLE, MIN_PROMPT_LENGTH,
};
pub use identity::{Identity, UserId};
pub use plan::{PlanTier, PlanTierParseError};
