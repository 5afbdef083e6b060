//! Axum HTTP API server.
//!
//! This crate provides:
//! - Mocked video generation gated by session and subscription tier
//! - Account deletion, sign-out and simulated subscription checkout
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{GenerationBackend, SimulatedGenerator};
pub use state::AppState;
