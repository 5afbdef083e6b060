//! Capability traits for the external collaborators.
//!
//! The API server only talks to these traits, so any implementation
//! (remote client, in-memory fake) can be injected.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use babi_models::{Identity, PlanTier, UserId};

use crate::config::{ProviderConfig, ProviderMode};
use crate::error::{ProviderError, ProviderResult};
use crate::memory::MemoryBackend;
use crate::postgrest::PostgrestStore;
use crate::stripe::StripeBilling;
use crate::supabase::SupabaseAuth;

/// Identity and session management.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Cheap local check of an access token. `None` when there is no usable session.
    async fn get_session(&self, access_token: &str) -> ProviderResult<Option<Identity>>;

    /// Authoritative user lookup for an access token.
    async fn get_user(&self, access_token: &str) -> ProviderResult<Option<Identity>>;

    /// End a session. Signing out without a token or with a revoked one succeeds.
    async fn sign_out(&self, access_token: Option<&str>) -> ProviderResult<()>;

    /// Permanently delete a user (admin capability).
    async fn delete_user(&self, user_id: &UserId) -> ProviderResult<()>;

    async fn check_connectivity(&self) -> ProviderResult<()>;
}

/// Subscription/tier data store.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Raw stored tier for a user, `None` when no record exists.
    async fn select_tier(&self, user_id: &UserId) -> ProviderResult<Option<String>>;

    async fn select_stripe_customer_id(&self, user_id: &UserId) -> ProviderResult<Option<String>>;

    /// Create or update the user's subscription record.
    async fn set_tier(&self, user_id: &UserId, tier: PlanTier) -> ProviderResult<()>;

    async fn check_connectivity(&self) -> ProviderResult<()>;
}

/// Payment processor.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn delete_customer(&self, customer_id: &str) -> ProviderResult<()>;
}

/// The set of collaborators injected into the API server.
#[derive(Clone)]
pub struct Providers {
    pub sessions: Arc<dyn SessionProvider>,
    pub entitlements: Arc<dyn EntitlementStore>,
    pub billing: Arc<dyn BillingProvider>,
}

impl Providers {
    /// Wire up all collaborators from one in-memory backend.
    pub fn memory(backend: Arc<MemoryBackend>) -> Self {
        Self {
            sessions: Arc::clone(&backend) as Arc<dyn SessionProvider>,
            entitlements: Arc::clone(&backend) as Arc<dyn EntitlementStore>,
            billing: backend as Arc<dyn BillingProvider>,
        }
    }

    /// Build the collaborators described by `config`.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        match config.mode {
            ProviderMode::Memory => {
                let backend = Arc::new(MemoryBackend::with_demo_sessions());
                info!("Using in-memory providers with demo sessions");
                Ok(Self::memory(backend))
            }
            ProviderMode::Supabase => {
                let supabase = config.supabase.clone().ok_or_else(|| {
                    ProviderError::not_configured("Supabase settings missing")
                })?;
                let http = build_http_client(config.timeout, config.connect_timeout)?;

                let sessions = SupabaseAuth::new(http.clone(), supabase.clone());
                let entitlements = PostgrestStore::new(http.clone(), supabase);
                let billing = StripeBilling::new(http, config.billing.clone());

                info!(
                    billing_configured = billing.is_configured(),
                    "Using Supabase providers"
                );

                Ok(Self {
                    sessions: Arc::new(sessions),
                    entitlements: Arc::new(entitlements),
                    billing: Arc::new(billing),
                })
            }
        }
    }
}

/// Shared HTTP client with pooling and timeouts.
pub fn build_http_client(timeout: Duration, connect_timeout: Duration) -> ProviderResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .user_agent(concat!("babi-providers/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Network)
}
