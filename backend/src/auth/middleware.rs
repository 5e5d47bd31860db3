//! Bearer token extraction
//!
//! Uses the pre-computed token issuer from AppState to verify tokens.

use crate::auth::scope::has_authority;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use sys_touch_shared::AuthError;
use tracing::debug;

/// Authenticated caller extracted from a verified JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub scope: String,
}

impl AuthUser {
    /// Fail with `InsufficientScope` unless the token grants `role`
    pub fn require(&self, role: &str) -> Result<(), AuthError> {
        if has_authority(&self.scope, role) {
            Ok(())
        } else {
            Err(AuthError::InsufficientScope)
        }
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = app_state.tokens().decode(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AuthError::InvalidToken
        })?;

        Ok(AuthUser {
            subject: claims.sub,
            scope: claims.scope,
        })
    }
}
