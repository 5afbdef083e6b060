//! Entitlement resolution.

use std::sync::Arc;

use tracing::{debug, warn};

use babi_models::{PlanTier, UserId};
use babi_providers::EntitlementStore;

use crate::metrics;

/// Resolves a user's tier from the subscription store.
///
/// Only an exact stored `"pro"` grants Pro. Missing records and lookup
/// failures resolve to Free. Nothing is cached across requests.
#[derive(Clone)]
pub struct EntitlementService {
    store: Arc<dyn EntitlementStore>,
}

impl EntitlementService {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, user_id: &UserId) -> PlanTier {
        match self.store.select_tier(user_id).await {
            Ok(Some(raw)) => {
                let tier = PlanTier::from_record(Some(raw.as_str()));
                debug!(user_id = %user_id, stored = %raw, tier = %tier, "Resolved tier");
                tier
            }
            Ok(None) => {
                debug!(user_id = %user_id, "No subscription record, using free tier");
                PlanTier::Free
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Tier lookup failed, using free tier");
                metrics::record_entitlement_fallback();
                PlanTier::Free
            }
        }
    }
}
