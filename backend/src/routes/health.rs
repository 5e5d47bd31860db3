//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (checks the credential store)
//! - /health/live - Liveness probe

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health checks
#[derive(Serialize)]
pub struct HealthChecks {
    pub credential_store: CheckStatus,
}

/// Status of an individual check
#[derive(Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    fn plain(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks: None,
        }
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::plain("healthy"))
}

/// Readiness probe, 503 while the credential store is unreachable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store_check = match state.store().health_check().await {
        Ok(()) => CheckStatus {
            healthy: true,
            message: None,
        },
        Err(e) => CheckStatus {
            healthy: false,
            message: Some(e.to_string()),
        },
    };

    let (status_code, status) = if store_check.healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: Some(HealthChecks {
            credential_store: store_check,
        }),
    };

    (status_code, Json(response))
}

/// Liveness probe - always OK while the server is running
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::plain("alive"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::repositories::{
        CreateCredentialError, CredentialRecord, CredentialStore, NewCredential,
    };
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnreachableStore;

    #[async_trait]
    impl CredentialStore for UnreachableStore {
        async fn find_by_username(&self, _: &str) -> anyhow::Result<Option<CredentialRecord>> {
            anyhow::bail!("connection refused")
        }

        async fn create(
            &self,
            _: NewCredential,
        ) -> Result<CredentialRecord, CreateCredentialError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn list(&self) -> anyhow::Result<Vec<CredentialRecord>> {
            anyhow::bail!("connection refused")
        }

        async fn health_check(&self) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_health_check_returns_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_check_returns_alive() {
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_store() {
        let state = AppState::new(Arc::new(UnreachableStore), AppConfig::default()).unwrap();
        let (status, response) = readiness_check(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status, "not_ready");
    }
}
