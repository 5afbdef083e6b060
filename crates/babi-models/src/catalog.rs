//! Plan and tool catalogs shown on the marketing pages.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::plan::PlanTier;

/// Credits consumed by one video generation.
pub const CREDITS_PER_VIDEO: u32 = 10;

/// Credits consumed by one dress change.
pub const CREDITS_PER_DRESS_CHANGE: u32 = 2;

/// A purchasable plan or one-time credit pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanOffer {
    /// Stable identifier used by checkout.
    pub id: String,
    pub name: String,
    /// Display price, e.g. "€39.90/mo".
    pub price: String,
    pub credits: u32,
    /// True for monthly subscriptions, false for one-time packs.
    pub recurring: bool,
    /// Tier granted by a subscription, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<PlanTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub highlighted: bool,
    pub features: Vec<String>,
}

impl PlanOffer {
    fn subscription(id: &str, name: &str, price: &str, credits: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            credits,
            recurring: true,
            tier: Some(PlanTier::Pro),
            badge: None,
            highlighted: false,
            features: vec![
                format!("{} AI video generations per month", credits / CREDITS_PER_VIDEO),
                format!("{} AI image generations per month", credits),
                format!("{} dress changes per month", credits / CREDITS_PER_DRESS_CHANGE),
            ],
        }
    }

    fn top_up(id: &str, name: &str, price: &str, credits: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            credits,
            recurring: false,
            tier: None,
            badge: None,
            highlighted: false,
            features: vec![
                "One-time purchase".to_string(),
                format!("{} AI video generations", credits / CREDITS_PER_VIDEO),
                format!("{} AI image generations", credits),
                format!("{} dress changes", credits / CREDITS_PER_DRESS_CHANGE),
            ],
        }
    }

    /// Subtext shown under the price.
    pub fn subtext(&self) -> String {
        if self.recurring {
            format!("{} credits/month", self.credits)
        } else {
            format!("{} credits", self.credits)
        }
    }
}

/// Full pricing catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanCatalog {
    pub subscriptions: Vec<PlanOffer>,
    pub top_ups: Vec<PlanOffer>,
}

impl PlanCatalog {
    /// The catalog offered on the upgrade page.
    pub fn standard() -> Self {
        let mut pro = PlanOffer::subscription("pro", "Pro", "€39.90/mo", 180);
        pro.badge = Some("Most Popular".to_string());
        pro.highlighted = true;

        Self {
            subscriptions: vec![
                PlanOffer::subscription("starter", "Starter", "€19.90/mo", 60),
                pro,
                PlanOffer::subscription("business", "Business", "€79.90/mo", 420),
            ],
            top_ups: vec![
                PlanOffer::top_up("starter-pack", "Starter Pack", "€44.90", 100),
                PlanOffer::top_up("value-pack", "Value Pack", "€64.90", 200),
                PlanOffer::top_up("pro-pack", "Pro Pack", "€74.90", 300),
            ],
        }
    }

    /// Find a subscription plan by id.
    pub fn subscription(&self, id: &str) -> Option<&PlanOffer> {
        self.subscriptions.iter().find(|p| p.id == id)
    }
}

/// Tools listed on the tools page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    VideoGeneration,
    ImageGenerator,
    AiDressChanger,
    AiCarChanger,
    AiPersonReplacer,
}

impl ToolKind {
    pub const ALL: &'static [ToolKind] = &[
        ToolKind::VideoGeneration,
        ToolKind::ImageGenerator,
        ToolKind::AiDressChanger,
        ToolKind::AiCarChanger,
        ToolKind::AiPersonReplacer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::VideoGeneration => "video-generation",
            ToolKind::ImageGenerator => "image-generator",
            ToolKind::AiDressChanger => "ai-dress-changer",
            ToolKind::AiCarChanger => "ai-car-changer",
            ToolKind::AiPersonReplacer => "ai-person-replacer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::VideoGeneration => "Video Generation",
            ToolKind::ImageGenerator => "Image Generator",
            ToolKind::AiDressChanger => "AI Dress Changer",
            ToolKind::AiCarChanger => "AI Car Changer",
            ToolKind::AiPersonReplacer => "AI Person Replacer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::VideoGeneration => "Create stunning videos from text prompts using AI",
            ToolKind::ImageGenerator => "Generate photorealistic images from text descriptions",
            ToolKind::AiDressChanger => "Transform your outfit with AI styling",
            ToolKind::AiCarChanger => "Change your car's color and style instantly",
            ToolKind::AiPersonReplacer => "Replace faces in photos using AI face-swap",
        }
    }

    /// Only video generation has a server-side endpoint.
    pub fn is_available(&self) -> bool {
        matches!(self, ToolKind::VideoGeneration)
    }
}

/// Tool entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolInfo {
    pub id: ToolKind,
    pub href: String,
    pub label: String,
    pub description: String,
    pub available: bool,
}

impl From<ToolKind> for ToolInfo {
    fn from(kind: ToolKind) -> Self {
        Self {
            id: kind,
            href: format!("/tools/{}", kind.as_str()),
            label: kind.label().to_string(),
            description: kind.description().to_string(),
            available: kind.is_available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_prices() {
        let catalog = PlanCatalog::standard();
        assert_eq!(catalog.subscriptions.len(), 3);
        assert_eq!(catalog.top_ups.len(), 3);

        let pro = catalog.subscription("pro").unwrap();
        assert_eq!(pro.price, "€39.90/mo");
        assert!(pro.highlighted);
        assert_eq!(pro.badge.as_deref(), Some("Most Popular"));
        assert_eq!(pro.subtext(), "180 credits/month");
        assert_eq!(pro.features[0], "18 AI video generations per month");
        assert_eq!(pro.features[2], "90 dress changes per month");
    }

    #[test]
    fn test_top_ups_are_one_time() {
        let catalog = PlanCatalog::standard();
        let pack = &catalog.top_ups[2];
        assert_eq!(pack.name, "Pro Pack");
        assert!(!pack.recurring);
        assert!(pack.tier.is_none());
        assert_eq!(pack.subtext(), "300 credits");
        assert_eq!(pack.features[0], "One-time purchase");
        assert_eq!(pack.features[1], "30 AI video generations");
        assert!(catalog.subscription("pro-pack").is_none());
    }

    #[test]
    fn test_only_video_generation_available() {
        let tools: Vec<ToolInfo> = ToolKind::ALL.iter().copied().map(ToolInfo::from).collect();
        assert_eq!(tools.len(), 5);
        assert_eq!(tools.iter().filter(|t| t.available).count(), 1);
        assert_eq!(tools[0].href, "/tools/video-generation");
        assert_eq!(
            serde_json::to_value(tools[3].id).unwrap(),
            serde_json::json!("ai-car-changer")
        );
    }
}
