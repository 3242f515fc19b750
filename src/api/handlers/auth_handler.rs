//! Authentication handlers: the session login form and the JSON endpoints.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use minijinja::context;
use serde::Deserialize;
use tower_sessions::Session;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::flash::{self, FlashKind};
use crate::api::middleware::{is_logged_in, login as start_session};
use crate::api::AppState;
use crate::config::{LOGIN_ROUTE, PROFILE_ROUTE};
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};
use crate::services::TokenResponse;
use crate::types::{ApiResponse, Created};

const INVALID_LOGIN: &str = "Invalid email or password";

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// User display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,
}

/// Credentials, as JSON for `/auth/token` or a form for `/auth/login`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/register", post(register))
        .route("/token", post(token))
}

/// Login form with pending flash messages. Signed-in users go to their profile.
pub async fn login_page(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    if is_logged_in(&session).await {
        return Ok(Redirect::to(PROFILE_ROUTE).into_response());
    }

    let flashes = flash::take(&session).await?;
    Ok(state.views.render("login.html", context! { flashes })?.into_response())
}

/// Local strategy over the login form.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginRequest>,
) -> AppResult<Redirect> {
    if let Err(errors) = form.validate() {
        flash::push(&session, FlashKind::Error, AppError::from(errors).to_string()).await?;
        return Ok(Redirect::to(LOGIN_ROUTE));
    }

    match state.auth_service.authenticate(&form.email, &form.password).await {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to(PROFILE_ROUTE))
        }
        Err(AppError::InvalidCredentials) => {
            flash::push(&session, FlashKind::Error, INVALID_LOGIN).await?;
            Ok(Redirect::to(LOGIN_ROUTE))
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(session: Session) -> AppResult<Redirect> {
    session.flush().await?;
    Ok(Redirect::to(LOGIN_ROUTE))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .auth_service
        .register(payload.email, payload.password, payload.name)
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/token",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::data(token))
}
