//! In-process providers for local development and tests.
//!
//! One backend implements every capability trait over shared state, so a
//! user deleted through the session provider also loses its sessions and
//! subscription record.

use std::collections::{HashMap, HashSet};
use std::fmt;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use babi_models::{Identity, PlanTier, UserId};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BillingProvider, EntitlementStore, SessionProvider};

/// Demo session token for a free-tier user.
pub const DEMO_FREE_TOKEN: &str = "demo-free-token";
/// Demo session token for a pro-tier user.
pub const DEMO_PRO_TOKEN: &str = "demo-pro-token";

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    Session,
    TierLookup,
    CustomerLookup,
    TierUpdate,
    SignOut,
    UserDeletion,
    Billing,
}

impl fmt::Display for FailurePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailurePoint::Session => "session",
            FailurePoint::TierLookup => "tier_lookup",
            FailurePoint::CustomerLookup => "customer_lookup",
            FailurePoint::TierUpdate => "tier_update",
            FailurePoint::SignOut => "sign_out",
            FailurePoint::UserDeletion => "user_deletion",
            FailurePoint::Billing => "billing",
        };
        f.write_str(name)
    }
}

/// Stored subscription row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    /// Raw tier value as stored; anything but `"pro"` reads as free.
    pub tier: String,
    pub stripe_customer_id: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, Identity>,
    sessions: HashMap<String, UserId>,
    subscriptions: HashMap<UserId, SubscriptionRecord>,
    deleted_customers: Vec<String>,
    failures: HashSet<FailurePoint>,
}

/// In-memory auth provider, subscription store and billing provider.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with one free and one pro demo account.
    pub fn with_demo_sessions() -> Self {
        let mut state = MemoryState::default();

        let free = Identity::new("demo-free-user", Some("free@demo.babiceva.ai".to_string()));
        let pro = Identity::new("demo-pro-user", Some("pro@demo.babiceva.ai".to_string()));

        state
            .sessions
            .insert(DEMO_FREE_TOKEN.to_string(), free.id.clone());
        state
            .sessions
            .insert(DEMO_PRO_TOKEN.to_string(), pro.id.clone());
        state.subscriptions.insert(
            pro.id.clone(),
            SubscriptionRecord {
                tier: PlanTier::Pro.as_str().to_string(),
                stripe_customer_id: Some("cus_demo_pro".to_string()),
            },
        );
        state.users.insert(free.id.clone(), free);
        state.users.insert(pro.id.clone(), pro);

        Self {
            state: RwLock::new(state),
        }
    }

    /// Register a user without a subscription record.
    pub async fn add_user(&self, identity: Identity) {
        self.state
            .write()
            .await
            .users
            .insert(identity.id.clone(), identity);
    }

    /// Issue a fresh session token for an existing user.
    pub async fn issue_session(&self, user_id: &UserId) -> String {
        let token = format!("mem-{}", Uuid::new_v4());
        self.state
            .write()
            .await
            .sessions
            .insert(token.clone(), user_id.clone());
        token
    }

    /// Store a raw subscription row for a user.
    pub async fn set_subscription(
        &self,
        user_id: &UserId,
        tier: impl Into<String>,
        stripe_customer_id: Option<&str>,
    ) {
        self.state.write().await.subscriptions.insert(
            user_id.clone(),
            SubscriptionRecord {
                tier: tier.into(),
                stripe_customer_id: stripe_customer_id.map(str::to_string),
            },
        );
    }

    pub async fn subscription(&self, user_id: &UserId) -> Option<SubscriptionRecord> {
        self.state.read().await.subscriptions.get(user_id).cloned()
    }

    /// Effective tier as the store reports it.
    pub async fn tier_of(&self, user_id: &UserId) -> PlanTier {
        let state = self.state.read().await;
        PlanTier::from_record(state.subscriptions.get(user_id).map(|s| s.tier.as_str()))
    }

    pub async fn user_exists(&self, user_id: &UserId) -> bool {
        self.state.read().await.users.contains_key(user_id)
    }

    pub async fn session_count(&self, user_id: &UserId) -> usize {
        self.state
            .read()
            .await
            .sessions
            .values()
            .filter(|id| *id == user_id)
            .count()
    }

    /// Billing customers deleted so far, in call order.
    pub async fn deleted_customers(&self) -> Vec<String> {
        self.state.read().await.deleted_customers.clone()
    }

    /// Make every subsequent call of `point` fail.
    pub async fn inject_failure(&self, point: FailurePoint) {
        self.state.write().await.failures.insert(point);
    }

    pub async fn clear_failure(&self, point: FailurePoint) {
        self.state.write().await.failures.remove(&point);
    }

    fn check(state: &MemoryState, point: FailurePoint) -> ProviderResult<()> {
        if state.failures.contains(&point) {
            warn!(operation = %point, "Injected provider failure");
            return Err(ProviderError::ServerError(
                503,
                format!("{} unavailable", point),
            ));
        }
        Ok(())
    }

    fn resolve(state: &MemoryState, access_token: &str) -> Option<Identity> {
        state
            .sessions
            .get(access_token)
            .and_then(|id| state.users.get(id))
            .cloned()
    }
}

#[async_trait]
impl SessionProvider for MemoryBackend {
    async fn get_session(&self, access_token: &str) -> ProviderResult<Option<Identity>> {
        let state = self.state.read().await;
        Self::check(&state, FailurePoint::Session)?;
        Ok(Self::resolve(&state, access_token))
    }

    async fn get_user(&self, access_token: &str) -> ProviderResult<Option<Identity>> {
        let state = self.state.read().await;
        Self::check(&state, FailurePoint::Session)?;
        Ok(Self::resolve(&state, access_token))
    }

    async fn sign_out(&self, access_token: Option<&str>) -> ProviderResult<()> {
        let mut state = self.state.write().await;
        Self::check(&state, FailurePoint::SignOut)?;

        if let Some(token) = access_token {
            if state.sessions.remove(token).is_some() {
                debug!("Session revoked");
            }
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> ProviderResult<()> {
        let mut state = self.state.write().await;
        Self::check(&state, FailurePoint::UserDeletion)?;

        if state.users.remove(user_id).is_none() {
            return Err(ProviderError::NotFound(format!("user {}", user_id)));
        }
        state.sessions.retain(|_, id| *id != *user_id);
        state.subscriptions.remove(user_id);

        info!(user_id = %user_id, "Deleted in-memory user");
        Ok(())
    }

    async fn check_connectivity(&self) -> ProviderResult<()> {
        let state = self.state.read().await;
        Self::check(&state, FailurePoint::Session)
    }
}

#[async_trait]
impl EntitlementStore for MemoryBackend {
    async fn select_tier(&self, user_id: &UserId) -> ProviderResult<Option<String>> {
        let state = self.state.read().await;
        Self::check(&state, FailurePoint::TierLookup)?;
        Ok(state.subscriptions.get(user_id).map(|s| s.tier.clone()))
    }

    async fn select_stripe_customer_id(&self, user_id: &UserId) -> ProviderResult<Option<String>> {
        let state = self.state.read().await;
        Self::check(&state, FailurePoint::CustomerLookup)?;
        Ok(state
            .subscriptions
            .get(user_id)
            .and_then(|s| s.stripe_customer_id.clone()))
    }

    async fn set_tier(&self, user_id: &UserId, tier: PlanTier) -> ProviderResult<()> {
        let mut state = self.state.write().await;
        Self::check(&state, FailurePoint::TierUpdate)?;

        state
            .subscriptions
            .entry(user_id.clone())
            .and_modify(|s| s.tier = tier.as_str().to_string())
            .or_insert_with(|| SubscriptionRecord {
                tier: tier.as_str().to_string(),
                stripe_customer_id: None,
            });
        Ok(())
    }

    async fn check_connectivity(&self) -> ProviderResult<()> {
        let state = self.state.read().await;
        Self::check(&state, FailurePoint::TierLookup)
    }
}

#[async_trait]
impl BillingProvider for MemoryBackend {
    async fn delete_customer(&self, customer_id: &str) -> ProviderResult<()> {
        let mut state = self.state.write().await;
        Self::check(&state, FailurePoint::Billing)?;
        state.deleted_customers.push(customer_id.to_string());
        Ok(())
    }
}
