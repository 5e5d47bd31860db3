//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! The state is built once at startup and is read-only afterwards; the
//! only cross-request resource is the credential store.

use crate::auth::{PasswordService, TokenIssuer};
use crate::config::AppConfig;
use crate::repositories::CredentialStore;
use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
///
/// All fields are `Arc`s or `Copy`, so cloning per request is O(1).
#[derive(Clone)]
pub struct AppState {
    /// Credential store
    pub store: Arc<dyn CredentialStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token issuer with pre-computed keys
    pub tokens: TokenIssuer,
    /// Hashing settings for newly stored passwords
    pub passwords: PasswordService,
    /// Prometheus renderer, present when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails when the configured signing keys cannot be loaded.
    pub fn new(store: Arc<dyn CredentialStore>, config: AppConfig) -> Result<Self> {
        let tokens = TokenIssuer::from_config(&config.jwt)?;
        let passwords = PasswordService::from_config(&config.security);

        Ok(Self {
            store,
            config: Arc::new(config),
            tokens,
            passwords,
            metrics: None,
        })
    }

    /// Attach a Prometheus handle so `/metrics` can render
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[inline]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[inline]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }
}
