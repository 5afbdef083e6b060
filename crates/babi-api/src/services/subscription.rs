//! Subscription upgrade and cancellation.
//!
//! Payment is simulated: checkout waits a fixed latency and then records the
//! new tier in the subscription store.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use babi_models::{PlanCatalog, PlanTier, UserId};
use babi_providers::{EntitlementStore, ProviderError};

use crate::metrics;

/// Plan used when checkout names none.
pub const DEFAULT_CHECKOUT_PLAN: &str = "pro";

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error(transparent)]
    Store(#[from] ProviderError),
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn EntitlementStore>,
    catalog: Arc<PlanCatalog>,
    checkout_latency: Duration,
}

impl SubscriptionService {
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        catalog: Arc<PlanCatalog>,
        checkout_latency: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            checkout_latency,
        }
    }

    /// Subscribe the user to `plan_id`, returning the tier granted.
    pub async fn checkout(&self, user_id: &UserId, plan_id: &str) -> Result<PlanTier, SubscriptionError> {
        let plan = self
            .catalog
            .subscription(plan_id)
            .ok_or_else(|| SubscriptionError::UnknownPlan(plan_id.to_string()))?;
        let tier = plan.tier.unwrap_or(PlanTier::Pro);

        if !self.checkout_latency.is_zero() {
            tokio::time::sleep(self.checkout_latency).await;
        }

        let result = self.store.set_tier(user_id, tier).await;
        metrics::record_subscription_change("checkout", &plan.id, result.is_ok());
        result?;

        info!(user_id = %user_id, plan = %plan.id, tier = %tier, "Subscription activated");
        Ok(tier)
    }

    /// Return the user to the free tier.
    pub async fn cancel(&self, user_id: &UserId) -> Result<PlanTier, SubscriptionError> {
        let result = self.store.set_tier(user_id, PlanTier::Free).await;
        metrics::record_subscription_change("cancel", PlanTier::Free.as_str(), result.is_ok());
        result?;

        info!(user_id = %user_id, "Subscription cancelled");
        Ok(PlanTier::Free)
    }
}
