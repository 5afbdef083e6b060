//! Stripe-compatible billing client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use crate::config::BillingConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::metrics::instrumented;
use crate::provider::BillingProvider;

const PROVIDER: &str = "stripe";

/// Billing client. Without a secret key every call is logged and skipped.
pub struct StripeBilling {
    http: Client,
    config: BillingConfig,
}

impl StripeBilling {
    pub fn new(http: Client, config: BillingConfig) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.secret_key.is_some()
    }
}

#[async_trait]
impl BillingProvider for StripeBilling {
    async fn delete_customer(&self, customer_id: &str) -> ProviderResult<()> {
        let Some(secret_key) = self.config.secret_key.as_deref() else {
            warn!(
                customer_id = %customer_id,
                "Would delete customer {} - billing not configured", customer_id
            );
            return Ok(());
        };

        let url = format!(
            "{}/v1/customers/{}",
            self.config.api_base,
            urlencoding::encode(customer_id)
        );

        instrumented(PROVIDER, "delete_customer", async {
            let response = self.http.delete(&url).bearer_auth(secret_key).send().await?;

            match response.status() {
                s if s.is_success() => {
                    info!(customer_id = %customer_id, "Deleted billing customer");
                    Ok(())
                }
                StatusCode::NOT_FOUND => {
                    info!(customer_id = %customer_id, "Billing customer already gone");
                    Ok(())
                }
                _ => Err(ProviderError::from_response(&url, response).await),
            }
        })
        .await
    }
}
