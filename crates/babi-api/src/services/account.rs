//! Account lifecycle.

use std::sync::Arc;

use tracing::{info, warn};

use babi_models::Identity;
use babi_providers::{BillingProvider, EntitlementStore, ProviderError, SessionProvider};

use crate::metrics;
use crate::services::non_fatal;

/// Deletes accounts with best-effort billing cleanup.
#[derive(Clone)]
pub struct AccountService {
    sessions: Arc<dyn SessionProvider>,
    entitlements: Arc<dyn EntitlementStore>,
    billing: Arc<dyn BillingProvider>,
}

impl AccountService {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        entitlements: Arc<dyn EntitlementStore>,
        billing: Arc<dyn BillingProvider>,
    ) -> Self {
        Self {
            sessions,
            entitlements,
            billing,
        }
    }

    /// Delete the caller's account.
    ///
    /// Only the auth-provider deletion is fatal. The billing customer lookup
    /// and deletion and the final sign-out are best effort.
    pub async fn delete_account(
        &self,
        identity: &Identity,
        access_token: &str,
    ) -> Result<(), ProviderError> {
        let user_id = &identity.id;

        let customer_id = non_fatal(
            "billing_customer_lookup",
            self.entitlements.select_stripe_customer_id(user_id),
        )
        .await
        .flatten();

        match customer_id.as_deref() {
            Some(customer_id) => {
                let deleted =
                    non_fatal("billing_customer_delete", self.billing.delete_customer(customer_id))
                        .await;
                if deleted.is_none() {
                    warn!(user_id = %user_id, "Continuing account deletion without billing cleanup");
                }
            }
            None => info!(user_id = %user_id, "No billing customer to delete"),
        }

        if let Err(e) = self.sessions.delete_user(user_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to delete user");
            metrics::record_account_deletion("failed");
            return Err(e);
        }

        // The session is already void once the user is gone.
        let _ = non_fatal("post_delete_sign_out", self.sessions.sign_out(Some(access_token))).await;

        info!(user_id = %user_id, "Account deleted");
        metrics::record_account_deletion("deleted");
        Ok(())
    }
}
