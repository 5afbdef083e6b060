//! Session extraction.
//!
//! Access tokens arrive as `Authorization: Bearer <token>`. A token counts
//! only when the auth provider accepts it on both the session check and the
//! user lookup; provider failures are treated as "no session".

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use tracing::{debug, warn};

use babi_models::Identity;
use babi_providers::SessionProvider;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw bearer token, if the request carries one. Never rejects.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(auth)| auth.token().trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(BearerToken(token))
    }
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
    /// The access token the caller presented.
    pub token: String,
}

/// Resolve a token to an identity, failing closed.
pub async fn resolve_session(sessions: &dyn SessionProvider, token: &str) -> Option<Identity> {
    let session = match sessions.get_session(token).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            debug!("No active session for token");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "Session check failed, treating as unauthenticated");
            return None;
        }
    };

    match sessions.get_user(token).await {
        Ok(Some(user)) if user.id == session.id => Some(user),
        Ok(Some(user)) => {
            warn!(session = %session.id, user = %user.id, "Session and user lookup disagree");
            None
        }
        Ok(None) => {
            debug!(user_id = %session.id, "User no longer exists");
            None
        }
        Err(e) => {
            warn!(error = %e, "User lookup failed, treating as unauthenticated");
            None
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = match BearerToken::from_request_parts(parts, state).await {
            Ok(token) => token,
            Err(never) => match never {},
        };
        let token = token.ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        let identity = resolve_session(state.providers.sessions.as_ref(), &token)
            .await
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        Ok(AuthUser { identity, token })
    }
}
