//! User endpoints
//!
//! Registration is open; listing requires the `ADMIN` authority.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use sys_touch_shared::{RegisterRequest, Role, UserSummary};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", post(register).get(list_users))
}

/// Register a new user
///
/// POST /users
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    let user = UserService::register(state.store(), state.passwords(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users
///
/// GET /users
///
/// # Authentication
/// Requires a Bearer token whose scope grants `ADMIN`.
async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    auth_user.require(Role::ADMIN)?;
    let users = UserService::list(state.store()).await?;
    Ok(Json(users))
}
