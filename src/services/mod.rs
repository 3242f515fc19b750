//! Application services. Handlers depend on the traits, never on storage.

mod auth_service;
mod user_service;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use user_service::{UserManager, UserService, USER_NOT_FOUND};
