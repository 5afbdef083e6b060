//! External collaborators for the Babiceva AI backend.
//!
//! This crate provides:
//! - Capability traits for sessions, entitlements and billing
//! - Supabase auth and PostgREST store clients
//! - A Stripe-compatible billing client
//! - An in-memory backend for local development and tests

pub mod config;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod postgrest;
pub mod provider;
pub mod stripe;
pub mod supabase;

pub use config::{BillingConfig, ProviderConfig, ProviderMode, SupabaseConfig};
pub use error::{ProviderError, ProviderResult};
pub use memory::{FailurePoint, MemoryBackend, SubscriptionRecord, DEMO_FREE_TOKEN, DEMO_PRO_TOKEN};
pub use postgrest::PostgrestStore;
pub use provider::{
    build_http_client, BillingProvider, EntitlementStore, Providers, SessionProvider,
};
pub use stripe::StripeBilling;
pub use supabase::SupabaseAuth;
