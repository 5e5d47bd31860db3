//! Login endpoint

use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use sys_touch_shared::{LoginRequest, LoginResponse};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchange a username and password for a signed token
///
/// POST /login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let issued = AuthService::login(state.store(), state.tokens(), &req.username, req.password).await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}
