//! The session user's own profile.

use axum::{extract::State, routing::get, Router};

use crate::api::middleware::SessionUser;
use crate::api::AppState;
use crate::config::PROFILE_ROUTE;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::ApiResponse;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route(PROFILE_ROUTE, get(profile))
}

/// Session user's profile, re-read so a deleted account surfaces as 404.
#[utoipa::path(
    get,
    path = "/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Session user's profile", body = UserResponse),
        (status = 303, description = "Not signed in; redirect to /auth/login"),
        (status = 404, description = "The user does not exist")
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_user(user.id).await?;
    Ok(ApiResponse::data(UserResponse::from(user)))
}
