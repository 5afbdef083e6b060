//! Provider call metrics.
//!
//! - Request counters by provider, operation and status
//! - Latency histograms

use std::future::Future;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info_span, Instrument};

use crate::error::ProviderResult;

/// Metric name constants for consistency.
pub mod names {
    /// Total provider requests by provider, operation and status.
    pub const REQUESTS_TOTAL: &str = "babi_provider_requests_total";

    /// Request latency in seconds by provider and operation.
    pub const LATENCY_SECONDS: &str = "babi_provider_latency_seconds";
}

/// Record metrics for a completed provider request.
pub fn record_request(provider: &str, operation: &str, status: u16, latency_secs: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "provider" => provider.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "provider" => provider.to_string(),
        "operation" => operation.to_string()
    )
    .record(latency_secs);
}

/// Run a provider call inside a tracing span and record its outcome.
pub async fn instrumented<T, F>(provider: &str, operation: &str, fut: F) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    let span = info_span!("provider_request", provider = %provider, operation = %operation);

    let start = Instant::now();
    let result = fut.instrument(span).await;
    let latency = start.elapsed().as_secs_f64();

    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.http_status().unwrap_or(500),
    };
    record_request(provider, operation, status, latency);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn test_metric_names() {
        assert!(names::REQUESTS_TOTAL.contains("requests"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
    }

    #[tokio::test]
    async fn test_instrumented_passes_result_through() {
        let ok: ProviderResult<u8> = instrumented("test", "op", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: ProviderResult<u8> =
            instrumented("test", "op", async { Err(ProviderError::RateLimited) }).await;
        assert!(matches!(err, Err(ProviderError::RateLimited)));
    }
}
