//! Supabase-compatible auth client (GoTrue REST API).
//!
//! - Local HS256 access-token verification for `get_session`
//! - `GET /auth/v1/user` for authoritative lookups
//! - `POST /auth/v1/logout` and admin user deletion

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use babi_models::{Identity, UserId};

use crate::config::SupabaseConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::metrics::instrumented;
use crate::provider::SessionProvider;

const PROVIDER: &str = "supabase_auth";

/// Audience Supabase puts in user access tokens.
const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims read from a Supabase access token.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserResponse> for Identity {
    fn from(user: UserResponse) -> Self {
        Identity::new(user.id, user.email.filter(|e| !e.is_empty()))
    }
}

/// Supabase auth client.
pub struct SupabaseAuth {
    http: Client,
    config: SupabaseConfig,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SupabaseAuth {
    pub fn new(http: Client, config: SupabaseConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        let decoding_key = match config.jwt_secret.as_deref() {
            Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
            None => {
                // Without the project secret, the session check only reads the
                // claims; `get_user` stays authoritative.
                validation.insecure_disable_signature_validation();
                DecodingKey::from_secret(&[])
            }
        };

        Self {
            http,
            config,
            decoding_key,
            validation,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path)
    }

    fn service_role_key(&self) -> ProviderResult<&str> {
        self.config.service_role_key.as_deref().ok_or_else(|| {
            ProviderError::not_configured("SUPABASE_SERVICE_ROLE_KEY is required for admin operations")
        })
    }

    /// Decode and validate an access token locally.
    pub fn decode_claims(&self, access_token: &str) -> ProviderResult<SessionClaims> {
        let data = decode::<SessionClaims>(access_token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[async_trait]
impl SessionProvider for SupabaseAuth {
    async fn get_session(&self, access_token: &str) -> ProviderResult<Option<Identity>> {
        match self.decode_claims(access_token) {
            Ok(claims) if !claims.sub.is_empty() => {
                Ok(Some(Identity::new(claims.sub, claims.email.filter(|e| !e.is_empty()))))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                debug!(error = %e, "Access token rejected");
                Ok(None)
            }
        }
    }

    async fn get_user(&self, access_token: &str) -> ProviderResult<Option<Identity>> {
        let url = self.endpoint("user");

        instrumented(PROVIDER, "get_user", async {
            let response = self
                .http
                .get(&url)
                .header("apikey", &self.config.anon_key)
                .bearer_auth(access_token)
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let user: UserResponse = response.json().await?;
                    Ok(Some(Identity::from(user)))
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                    debug!(status = %response.status(), "Auth provider reported no user");
                    Ok(None)
                }
                _ => Err(ProviderError::from_response(&url, response).await),
            }
        })
        .await
    }

    async fn sign_out(&self, access_token: Option<&str>) -> ProviderResult<()> {
        let Some(token) = access_token else {
            debug!("Sign-out without a session");
            return Ok(());
        };
        let url = self.endpoint("logout");

        instrumented(PROVIDER, "sign_out", async {
            let response = self
                .http
                .post(&url)
                .header("apikey", &self.config.anon_key)
                .bearer_auth(token)
                .send()
                .await?;

            match response.status() {
                s if s.is_success() => Ok(()),
                // Session already gone
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                    debug!(status = %response.status(), "Session already signed out");
                    Ok(())
                }
                _ => Err(ProviderError::from_response(&url, response).await),
            }
        })
        .await
    }

    async fn delete_user(&self, user_id: &UserId) -> ProviderResult<()> {
        let key = self.service_role_key()?;
        let url = self.endpoint(&format!(
            "admin/users/{}",
            urlencoding::encode(user_id.as_str())
        ));

        instrumented(PROVIDER, "delete_user", async {
            let response = self
                .http
                .delete(&url)
                .header("apikey", key)
                .bearer_auth(key)
                .send()
                .await?;

            if response.status().is_success() {
                info!(user_id = %user_id, "Deleted user from auth provider");
                Ok(())
            } else {
                Err(ProviderError::from_response(&url, response).await)
            }
        })
        .await
    }

    async fn check_connectivity(&self) -> ProviderResult<()> {
        let url = self.endpoint("health");

        instrumented(PROVIDER, "health", async {
            let response = self
                .http
                .get(&url)
                .header("apikey", &self.config.anon_key)
                .send()
                .await?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(ProviderError::from_response(&url, response).await)
            }
        })
        .await
    }
}
