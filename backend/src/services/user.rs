//! User registration, listing and the startup admin bootstrap

use crate::auth::PasswordService;
use crate::config::BootstrapAdminConfig;
use crate::error::ApiError;
use crate::repositories::{CredentialStore, NewCredential};
use anyhow::Result;
use secrecy::ExposeSecret;
use sys_touch_shared::{RegisterRequest, Role, UserSummary, MIN_PASSWORD_LENGTH};
use tracing::info;
use validator::Validate;

/// User service for account operations
pub struct UserService;

impl UserService {
    /// Register a new user with the `BASIC` role
    ///
    /// Password hashing is offloaded to the blocking thread pool.
    pub async fn register(
        store: &dyn CredentialStore,
        passwords: &PasswordService,
        req: RegisterRequest,
    ) -> Result<UserSummary, ApiError> {
        req.validate()?;

        if req.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if store.find_by_username(&req.username).await?.is_some() {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        let password_hash = passwords
            .hash_async(req.password.expose_secret().to_owned())
            .await?;

        let user = store
            .create(NewCredential {
                username: req.username,
                password_hash,
                roles: vec![Role::basic()],
            })
            .await?;

        info!(user_id = %user.user_id, "User registered");
        Ok(user.into())
    }

    /// List all users
    pub async fn list(store: &dyn CredentialStore) -> Result<Vec<UserSummary>, ApiError> {
        let users = store.list().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Create the configured administrator unless it already exists
    ///
    /// Returns `true` when a new account was created.
    pub async fn ensure_admin(
        store: &dyn CredentialStore,
        passwords: &PasswordService,
        config: &BootstrapAdminConfig,
    ) -> Result<bool> {
        if !config.enabled {
            return Ok(false);
        }

        if store.find_by_username(&config.username).await?.is_some() {
            info!(username = %config.username, "Admin user already exists");
            return Ok(false);
        }

        let password_hash = passwords.hash_async(config.password.clone()).await?;
        let admin = store
            .create(NewCredential {
                username: config.username.clone(),
                password_hash,
                roles: vec![Role::admin()],
            })
            .await?;

        info!(user_id = %admin.user_id, username = %admin.username, "Admin user created");
        Ok(true)
    }
}
