//! Subscription tiers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Subscription tier of a user.
///
/// Capabilities are derived from the tier at request time only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

impl PlanTier {
    /// Resolve a tier from a stored subscription record.
    ///
    /// Only an exact `"pro"` grants the Pro tier. Anything else, including a
    /// missing record, resolves to Free.
    pub fn from_record(tier: Option<&str>) -> Self {
        match tier {
            Some("pro") => PlanTier::Pro,
            _ => PlanTier::Free,
        }
    }

    /// Whether this tier unlocks Pro-only features.
    pub fn is_pro(&self) -> bool {
        matches!(self, PlanTier::Pro)
    }

    /// Get the tier name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = PlanTierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            _ => Err(PlanTierParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown plan tier: {0}")]
pub struct PlanTierParseError(String);
