//! Common test utilities for integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use sys_touch_backend::{
    auth::{PasswordService, TokenIssuer},
    config::{AppConfig, PasswordScheme, StorageBackend},
    repositories::{CredentialRecord, CredentialStore, InMemoryCredentialStore, NewCredential},
    routes,
    state::AppState,
};
use sys_touch_shared::Role;
use tower::ServiceExt;

/// Test application wrapper around an in-memory credential store
pub struct TestApp {
    pub app: Router,
    pub store: Arc<InMemoryCredentialStore>,
    pub tokens: TokenIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, None)
    }

    /// Test app whose `/metrics` renders from `handle`
    pub fn with_metrics(handle: PrometheusHandle) -> Self {
        Self::build(test_config(), Some(handle))
    }

    fn build(config: AppConfig, metrics: Option<PrometheusHandle>) -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let mut state = AppState::new(store.clone(), config).expect("Failed to build state");
        if let Some(handle) = metrics {
            state = state.with_metrics(handle);
        }
        let tokens = state.tokens().clone();
        let app = routes::create_router(state);

        Self { app, store, tokens }
    }

    /// Store a user directly, bypassing registration
    pub async fn seed_user(&self, username: &str, password: &str, roles: Vec<Role>) -> CredentialRecord {
        let password_hash = PasswordService::new(PasswordScheme::Bcrypt, 4)
            .hash(password)
            .expect("Failed to hash password");

        self.store
            .create(NewCredential {
                username: username.to_string(),
                password_hash,
                roles,
            })
            .await
            .expect("Failed to seed user")
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.storage.backend = StorageBackend::Memory;
    config.jwt.secret = "test-secret-key-for-testing-only-32chars".to_string();
    config.security.bcrypt_cost = 4;
    config
}
