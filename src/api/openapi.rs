//! OpenAPI document served behind Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, profile_handler, user_handler};
use crate::domain::{UserResponse, UserRole};
use crate::services::TokenResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "backend-forge",
        version = "0.1.0",
        description = "Reference backend for the projects forge generates"
    ),
    paths(
        auth_handler::register,
        auth_handler::token,
        user_handler::list_users,
        user_handler::get_user,
        profile_handler::profile,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, sessions and tokens"),
        (name = "Users", description = "User lookups")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT obtained from /auth/token"))
                        .build(),
                ),
            );
        }
    }
}
