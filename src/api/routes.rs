//! Application route configuration.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::time::Duration, Expiry, SessionManagerLayer, SessionStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{auth_routes, profile_routes, user_routes};
use super::openapi::ApiDoc;
use super::AppState;
use crate::errors::AppError;

/// Build the router over the given session store. Layers, innermost first:
/// route guards, not-found fallback, sessions (flash messages live there),
/// request tracing.
pub fn create_router<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let sessions = SessionManagerLayer::new(store)
        .with_name(state.config.session_cookie_name.clone())
        .with_secure(false)
        .with_signed(state.session_key.clone())
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.config.session_ttl_minutes,
        )));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/auth", auth_routes())
        .nest("/users", user_routes(state.clone()))
        .merge(profile_routes())
        .fallback(not_found)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Welcome to backend-forge"
}

async fn not_found() -> AppError {
    AppError::NotFound
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let result = match state.database() {
        Some(database) => database.ping().await.map_err(|e| e.to_string()),
        None => Err("no database configured".to_string()),
    };

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "healthy",
                error: None,
            }),
        ),
        Err(error) => {
            tracing::warn!(error = %error, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: "unhealthy",
                    error: Some(error),
                }),
            )
        }
    }
}
