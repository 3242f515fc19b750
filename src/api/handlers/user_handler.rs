//! User handlers (bearer-authenticated).

use axum::{
    extract::{Path, State},
    middleware::{self, from_extractor},
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use crate::api::middleware::{auth_middleware, CurrentUser, PoliciesGuard, ReadAllUsers};
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::policies::{Ability, Action, Subject};
use crate::types::ApiResponse;

/// `/users` routes. Every route requires a bearer token; listing also
/// requires the [`ReadAllUsers`] policy. A single user is readable by its
/// owner and by `admin`.
pub fn user_routes(state: AppState) -> Router<AppState> {
    let listing = Router::new()
        .route("/", get(list_users))
        .route_layer(from_extractor::<PoliciesGuard<ReadAllUsers>>());

    Router::new()
        .route("/:id", get(get_user))
        .merge(listing)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// List verified users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Verified users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list_verified().await?;
    Ok(ApiResponse::data(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Not the owner"),
        (status = 404, description = "The user does not exist")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<UserResponse>> {
    tracing::debug!(requested_by = %current_user.id, user_id = %id, "User lookup");
    let user = state.user_service.get_user(id).await?;
    Ability::for_user(current_user.id, &current_user.roles)
        .check_on(Action::Read, Subject::User, user.id)
        .inspect_err(|_| tracing::debug!(user_id = %current_user.id, "Ownership check failed"))?;
    Ok(ApiResponse::data(UserResponse::from(user)))
}
