//! Business logic services.

pub mod account;
pub mod entitlement;
pub mod generation;
pub mod subscription;

use std::future::Future;

use tracing::warn;

use babi_providers::ProviderResult;

use crate::metrics;

pub use account::AccountService;
pub use entitlement::EntitlementService;
pub use generation::{GenerationBackend, GenerationError, SimulatedGenerator};
pub use subscription::{SubscriptionError, SubscriptionService};

/// Run a dependency call whose failure must not change the request outcome.
///
/// Failures are logged at `warn` and counted; the caller gets `None`.
pub async fn non_fatal<T, F>(operation: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(operation, error = %e, "Non-fatal dependency call failed");
            metrics::record_non_fatal_failure(operation);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use babi_providers::ProviderError;

    #[tokio::test]
    async fn test_non_fatal_swallows_errors() {
        let ok = non_fatal("test", async { Ok::<_, ProviderError>(3) }).await;
        assert_eq!(ok, Some(3));

        let failed = non_fatal("test", async {
            Err::<u8, _>(ProviderError::ServerError(502, "down".into()))
        })
        .await;
        assert_eq!(failed, None);
    }
}
