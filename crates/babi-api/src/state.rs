//! Application state.

use std::sync::Arc;

use anyhow::Context;

use babi_models::PlanCatalog;
use babi_providers::{MemoryBackend, ProviderConfig, Providers};

use crate::config::ApiConfig;
use crate::services::{
    AccountService, EntitlementService, GenerationBackend, SimulatedGenerator, SubscriptionService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub providers: Providers,
    pub catalog: Arc<PlanCatalog>,
    pub generator: Arc<dyn GenerationBackend>,
    pub entitlements: EntitlementService,
    pub accounts: AccountService,
    pub subscriptions: SubscriptionService,
}

impl AppState {
    /// Wire services around the given collaborators.
    pub fn new(config: ApiConfig, providers: Providers) -> Self {
        let generator = Arc::new(SimulatedGenerator::new(config.generation_latency));
        Self::with_generator(config, providers, generator)
    }

    /// Like [`AppState::new`], with a custom generation backend.
    pub fn with_generator(
        config: ApiConfig,
        providers: Providers,
        generator: Arc<dyn GenerationBackend>,
    ) -> Self {
        let catalog = Arc::new(PlanCatalog::standard());

        let entitlements = EntitlementService::new(Arc::clone(&providers.entitlements));
        let accounts = AccountService::new(
            Arc::clone(&providers.sessions),
            Arc::clone(&providers.entitlements),
            Arc::clone(&providers.billing),
        );
        let subscriptions = SubscriptionService::new(
            Arc::clone(&providers.entitlements),
            Arc::clone(&catalog),
            config.checkout_latency,
        );

        Self {
            config,
            providers,
            catalog,
            generator,
            entitlements,
            accounts,
            subscriptions,
        }
    }

    /// State over an in-memory backend.
    pub fn memory(config: ApiConfig, backend: Arc<MemoryBackend>) -> Self {
        Self::new(config, Providers::memory(backend))
    }

    /// Build state from environment configuration.
    pub fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        let provider_config =
            ProviderConfig::from_env().context("Invalid provider configuration")?;
        let providers =
            Providers::from_config(&provider_config).context("Failed to build providers")?;

        Ok(Self::new(config, providers))
    }
}
