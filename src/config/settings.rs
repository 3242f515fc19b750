//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SEED_ADMIN_EMAIL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_COOKIE_NAME,
    DEFAULT_SESSION_TTL_MINUTES, MIN_JWT_SECRET_LENGTH, MIN_SESSION_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Development-only access token secret
const DEV_ACCESS_TOKEN_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

/// Development-only session cookie signing secret
const DEV_SESSION_SECRET: &str =
    "dev-session-secret-used-to-sign-cookies-needs-at-least-sixty-four-bytes";

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    access_token_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub session_cookie_name: String,
    pub session_ttl_minutes: i64,
    session_secret: String,
    pub seed_admin_email: String,
    seed_admin_password: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .field("session_secret", &"[REDACTED]")
            .field("seed_admin_email", &self.seed_admin_email)
            .field("seed_admin_password", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails when `ACCESS_TOKEN_SECRET` or `SESSION_SECRET` is missing in a
    /// release build, or either is shorter than its minimum length.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let access_token_secret = match env::var("ACCESS_TOKEN_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("ACCESS_TOKEN_SECRET not set, using insecure default for development");
                DEV_ACCESS_TOKEN_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::validation(
                    "ACCESS_TOKEN_SECRET environment variable must be set in production",
                ))
            }
        };

        if access_token_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::validation(format!(
                "ACCESS_TOKEN_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("SESSION_SECRET not set, using insecure default for development");
                DEV_SESSION_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::validation(
                    "SESSION_SECRET environment variable must be set in production",
                ))
            }
        };

        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            return Err(AppError::validation(format!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            access_token_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE_NAME.to_string()),
            session_ttl_minutes: parse_var("SESSION_TTL_MINUTES")
                .unwrap_or(DEFAULT_SESSION_TTL_MINUTES),
            session_secret,
            seed_admin_email: env::var("SEED_ADMIN_EMAIL")
                .unwrap_or_else(|_| DEFAULT_SEED_ADMIN_EMAIL.to_string()),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
        })
    }

    /// Configuration with development defaults and the given token secret.
    pub fn development(access_token_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            access_token_secret: access_token_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            session_secret: DEV_SESSION_SECRET.to_string(),
            seed_admin_email: DEFAULT_SEED_ADMIN_EMAIL.to_string(),
            seed_admin_password: None,
        }
    }

    /// Get access token secret bytes for token signing/verification.
    pub fn access_token_secret_bytes(&self) -> &[u8] {
        self.access_token_secret.as_bytes()
    }

    /// Secret the session cookie is signed with.
    pub fn session_secret_bytes(&self) -> &[u8] {
        self.session_secret.as_bytes()
    }

    /// Password for the seeded administrator, if configured.
    pub fn seed_admin_password(&self) -> Option<&str> {
        self.seed_admin_password.as_deref()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
