//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second (per client IP, `/api` routes)
    pub rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Simulated generation latency
    pub generation_latency: Duration,
    /// Simulated payment latency on checkout
    pub checkout_latency: Duration,
    /// Serve `/metrics`
    pub metrics_enabled: bool,
    /// Key rate limiting on `X-Forwarded-For`/`X-Real-IP`. Only safe behind
    /// a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            generation_latency: Duration::from_millis(2000),
            checkout_latency: Duration::from_millis(1500),
            metrics_enabled: true,
            trust_proxy_headers: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parse("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            generation_latency: env_parse("GENERATION_LATENCY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.generation_latency),
            checkout_latency: env_parse("CHECKOUT_LATENCY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.checkout_latency),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            trust_proxy_headers: std::env::var("TRUST_PROXY_HEADERS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.trust_proxy_headers),
        }
    }

    /// Config with no simulated latency and metrics off.
    pub fn for_tests() -> Self {
        Self {
            generation_latency: Duration::ZERO,
            checkout_latency: Duration::ZERO,
            metrics_enabled: false,
            rate_limit_rps: 1000,
            ..Self::default()
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
