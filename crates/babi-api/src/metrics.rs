//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "babi_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "babi_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "babi_http_requests_in_flight";

    // Generation metrics
    pub const GENERATIONS_TOTAL: &str = "babi_generations_total";

    // Entitlement and account metrics
    pub const ENTITLEMENT_FALLBACKS_TOTAL: &str = "babi_entitlement_fallbacks_total";
    pub const SUBSCRIPTION_CHANGES_TOTAL: &str = "babi_subscription_changes_total";
    pub const ACCOUNT_DELETIONS_TOTAL: &str = "babi_account_deletions_total";
    pub const NON_FATAL_FAILURES_TOTAL: &str = "babi_non_fatal_failures_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "babi_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a generation outcome.
///
/// `model` is the known model name or `"other"`; outcome is one of
/// `succeeded`, `invalid`, `forbidden`, `failed`.
pub fn record_generation(model: &str, outcome: &str) {
    let labels = [
        ("model", model.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!(names::GENERATIONS_TOTAL, &labels).increment(1);
}

/// Record a tier lookup that fell back to free because the store failed.
pub fn record_entitlement_fallback() {
    counter!(names::ENTITLEMENT_FALLBACKS_TOTAL).increment(1);
}

/// Record a checkout or cancellation.
pub fn record_subscription_change(action: &str, plan: &str, success: bool) {
    let labels = [
        ("action", action.to_string()),
        ("plan", plan.to_string()),
        ("success", success.to_string()),
    ];
    counter!(names::SUBSCRIPTION_CHANGES_TOTAL, &labels).increment(1);
}

/// Record an account deletion attempt.
pub fn record_account_deletion(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::ACCOUNT_DELETIONS_TOTAL, &labels).increment(1);
}

/// Record a swallowed dependency failure.
pub fn record_non_fatal_failure(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::NON_FATAL_FAILURES_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Route template for labels, so ids never end up in metric cardinality.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
