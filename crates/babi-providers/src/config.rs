//! Provider configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Default Stripe API base URL.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Which set of collaborators to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    /// Supabase-compatible auth + PostgREST store, Stripe-compatible billing.
    Supabase,
    /// In-process fakes seeded with demo sessions (local development).
    Memory,
}

impl ProviderMode {
    fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" | "local" => ProviderMode::Memory,
            _ => ProviderMode::Supabase,
        }
    }
}

/// Supabase project settings.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, without trailing slash.
    pub url: String,
    /// Public anon key, sent as `apikey`.
    pub anon_key: String,
    /// Service-role key for admin and store calls.
    pub service_role_key: Option<String>,
    /// JWT secret for local access-token verification.
    pub jwt_secret: Option<String>,
}

/// Billing provider settings.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// API base URL, without trailing slash.
    pub api_base: String,
    /// Secret key. When absent, billing calls are logged and skipped.
    pub secret_key: Option<String>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            secret_key: None,
        }
    }
}

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub mode: ProviderMode,
    pub supabase: Option<SupabaseConfig>,
    pub billing: BillingConfig,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl ProviderConfig {
    /// Config for the in-memory backend.
    pub fn memory() -> Self {
        Self {
            mode: ProviderMode::Memory,
            supabase: None,
            billing: BillingConfig::default(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let mode = std::env::var("PROVIDER_MODE")
            .map(|s| ProviderMode::from_str_lossy(&s))
            .unwrap_or(ProviderMode::Supabase);

        let supabase = match mode {
            ProviderMode::Memory => None,
            ProviderMode::Supabase => Some(SupabaseConfig::from_env()?),
        };

        let billing = BillingConfig {
            api_base: normalize_base_url(
                &std::env::var("STRIPE_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string()),
            )?,
            secret_key: non_empty_env("STRIPE_SECRET_KEY"),
        };

        let timeout_secs: u64 = std::env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let connect_timeout_secs: u64 = std::env::var("PROVIDER_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            mode,
            supabase,
            billing,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }
}

impl SupabaseConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let url = non_empty_env("SUPABASE_URL").ok_or_else(|| {
            ProviderError::not_configured("SUPABASE_URL must be set (or PROVIDER_MODE=memory)")
        })?;
        let anon_key = non_empty_env("SUPABASE_ANON_KEY")
            .ok_or_else(|| ProviderError::not_configured("SUPABASE_ANON_KEY must be set"))?;

        Ok(Self {
            url: normalize_base_url(&url)?,
            anon_key,
            service_role_key: non_empty_env("SUPABASE_SERVICE_ROLE_KEY"),
            jwt_secret: non_empty_env("SUPABASE_JWT_SECRET"),
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate an http(s) base URL and strip any trailing slash.
pub fn normalize_base_url(raw: &str) -> ProviderResult<String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| ProviderError::not_configured(format!("Invalid URL '{}': {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ProviderError::not_configured(format!(
                "Invalid URL scheme '{}' in '{}'",
                scheme, raw
            )))
        }
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
