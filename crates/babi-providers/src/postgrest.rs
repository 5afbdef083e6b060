//! Subscription store over the PostgREST API.
//!
//! Table `subscriptions(user_id, tier, stripe_customer_id, updated_at)`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use babi_models::{PlanTier, UserId};

use crate::config::SupabaseConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::metrics::instrumented;
use crate::provider::EntitlementStore;

const PROVIDER: &str = "postgrest";
const TABLE: &str = "subscriptions";

#[derive(Debug, Deserialize)]
struct TierRow {
    #[serde(default)]
    tier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(default)]
    stripe_customer_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubscriptionUpsert<'a> {
    user_id: &'a str,
    tier: &'a str,
    updated_at: String,
}

/// PostgREST-backed entitlement store.
pub struct PostgrestStore {
    http: Client,
    config: SupabaseConfig,
}

impl PostgrestStore {
    pub fn new(http: Client, config: SupabaseConfig) -> Self {
        Self { http, config }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, TABLE)
    }

    /// Service-role key bypasses row-level security; fall back to the anon key.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self
            .config
            .service_role_key
            .as_deref()
            .unwrap_or(&self.config.anon_key);
        request.header("apikey", key).bearer_auth(key)
    }

    async fn select_column<R, T>(
        &self,
        operation: &str,
        user_id: &UserId,
        column: &str,
        extract: impl FnOnce(R) -> Option<T> + Send,
    ) -> ProviderResult<Option<T>>
    where
        R: for<'de> Deserialize<'de>,
    {
        let url = self.table_url();
        let filter = format!("eq.{}", user_id.as_str());

        instrumented(PROVIDER, operation, async {
            let response = self
                .authorize(self.http.get(&url))
                .query(&[
                    ("user_id", filter.as_str()),
                    ("select", column),
                    ("limit", "1"),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(ProviderError::from_response(&url, response).await);
            }

            let rows: Vec<R> = response.json().await?;
            Ok(rows.into_iter().next().and_then(extract))
        })
        .await
    }
}

#[async_trait]
impl EntitlementStore for PostgrestStore {
    async fn select_tier(&self, user_id: &UserId) -> ProviderResult<Option<String>> {
        self.select_column("select_tier", user_id, "tier", |row: TierRow| row.tier)
            .await
    }

    async fn select_stripe_customer_id(&self, user_id: &UserId) -> ProviderResult<Option<String>> {
        self.select_column(
            "select_customer",
            user_id,
            "stripe_customer_id",
            |row: CustomerRow| row.stripe_customer_id.filter(|id| !id.is_empty()),
        )
        .await
    }

    async fn set_tier(&self, user_id: &UserId, tier: PlanTier) -> ProviderResult<()> {
        let url = self.table_url();
        let body = SubscriptionUpsert {
            user_id: user_id.as_str(),
            tier: tier.as_str(),
            updated_at: Utc::now().to_rfc3339(),
        };

        instrumented(PROVIDER, "set_tier", async {
            let response = self
                .authorize(self.http.post(&url))
                .query(&[("on_conflict", "user_id")])
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(ProviderError::from_response(&url, response).await);
            }

            info!(user_id = %user_id, tier = %tier, "Subscription tier updated");
            Ok(())
        })
        .await
    }

    async fn check_connectivity(&self) -> ProviderResult<()> {
        let url = self.table_url();

        instrumented(PROVIDER, "health", async {
            let response = self
                .authorize(self.http.get(&url))
                .query(&[("select", "user_id"), ("limit", "1")])
                .send()
                .await?;

            if response.status().is_success() {
                debug!("Subscription store reachable");
                Ok(())
            } else {
                Err(ProviderError::from_response(&url, response).await)
            }
        })
        .await
    }
}
