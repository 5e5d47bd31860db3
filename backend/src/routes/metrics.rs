//! Prometheus scrape endpoint

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;

/// GET /metrics
///
/// 404 when no recorder was installed (tests, embedded use).
pub async fn render(State(state): State<AppState>) -> ApiResult<String> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| ApiError::NotFound("Metrics are not enabled".to_string()))
}
