//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    cancel_subscription, checkout, delete_account, generate_video, get_profile, get_subscription,
    health, list_plans, list_tools, ready, sign_out,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let generation_routes = Router::new()
        .route("/generate", post(generate_video))
        .route("/generate-video", post(generate_video));

    let account_routes = Router::new()
        .route("/account/delete", post(delete_account))
        .route("/auth/signout", post(sign_out))
        .route("/profile", get(get_profile));

    let subscription_routes = Router::new()
        .route("/subscription", get(get_subscription))
        .route("/subscription/checkout", post(checkout))
        .route("/subscription/cancel", post(cancel_subscription));

    let catalog_routes = Router::new()
        .route("/plans", get(list_plans))
        .route("/tools", get(list_tools));

    let rate_limiter = Arc::new(
        RateLimiterCache::new(state.config.rate_limit_rps)
            .trust_proxy_headers(state.config.trust_proxy_headers),
    );

    let api_routes = Router::new()
        .merge(generation_routes)
        .merge(account_routes)
        .merge(subscription_routes)
        .merge(catalog_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    // Outermost first
    let layers = ServiceBuilder::new()
        .layer(cors_layer(&state.config.cors_origins))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(layers)
        .with_state(state)
}
