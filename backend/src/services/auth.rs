//! Login flow
//!
//! Looks the user up, verifies the password and mints a token. Unknown
//! usernames and wrong passwords fail identically.

use crate::auth::{scope_from_roles, IssuedToken, PasswordService, TokenIssuer};
use crate::error::ApiError;
use crate::repositories::CredentialStore;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use sys_touch_shared::AuthError;
use tracing::{debug, info, warn};

const LOGIN_ATTEMPTS: &str = "sys_touch_login_attempts_total";

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Verify `username`/`password` and issue a signed token
    ///
    /// Password verification runs on the blocking thread pool. Store and
    /// signing failures surface as internal errors. Every attempt is
    /// counted under `outcome` = `success`, `rejected` or `error`.
    pub async fn login(
        store: &dyn CredentialStore,
        tokens: &TokenIssuer,
        username: &str,
        password: SecretString,
    ) -> Result<IssuedToken, ApiError> {
        let result = Self::authenticate(store, tokens, username, password).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ApiError::Unauthorized(_)) => "rejected",
            Err(_) => "error",
        };
        metrics::counter!(LOGIN_ATTEMPTS, "outcome" => outcome).increment(1);

        result
    }

    async fn authenticate(
        store: &dyn CredentialStore,
        tokens: &TokenIssuer,
        username: &str,
        password: SecretString,
    ) -> Result<IssuedToken, ApiError> {
        let Some(user) = store.find_by_username(username).await? else {
            debug!(username, "Login rejected: unknown username");
            return Err(AuthError::InvalidCredentials.into());
        };

        let matches = PasswordService::verify_async(
            password.expose_secret().to_owned(),
            user.password_hash.clone(),
        )
        .await
        .unwrap_or_else(|e| {
            warn!(user_id = %user.user_id, error = %e, "Password verification failed");
            false
        });

        if !matches {
            debug!(user_id = %user.user_id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let scope = scope_from_roles(&user.roles);
        let issued = tokens.issue(&user.user_id.to_string(), &scope, Utc::now())?;

        info!(user_id = %user.user_id, expires_in = issued.expires_in, "Token issued");

        Ok(issued)
    }
}
