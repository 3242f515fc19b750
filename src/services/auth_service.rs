//! Authentication: local credentials, bearer tokens and the seeded admin.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Hash verified against when the email is unknown, so both paths cost the same.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| Password::new("timing-equaliser-password").ok().map(Password::into_string));

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub roles: Vec<UserRole>,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account; an existing email is a conflict.
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User>;

    /// Local strategy: resolve credentials to a user.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;

    /// Authenticate and issue a bearer token.
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Bearer strategy: validate a token and return its claims.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        roles: user.roles.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_token_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// [`AuthService`] over a [`UserRepository`]
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    config: Config,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, config: Config) -> Self {
        Self { users, config }
    }

    /// Create a verified admin unless the email is already taken.
    ///
    /// Returns `None` when an account with that email exists.
    pub async fn ensure_admin(&self, email: &str, name: &str, password: &str) -> AppResult<Option<User>> {
        if self.users.find_by_email(email).await?.is_some() {
            tracing::info!(email = %email, "Admin already present, skipping");
            return Ok(None);
        }

        let hash = Password::new(password)?.into_string();
        let mut admin = User::new(Uuid::new_v4(), email.to_string(), hash, name.to_string());
        admin.grant(UserRole::Admin);
        admin.verify();

        let admin = self.users.create(admin).await?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "Admin seeded");
        Ok(Some(admin))
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User> {
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .users
            .create(User::new(Uuid::new_v4(), email, password_hash, name))
            .await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self.users.find_by_email(email).await?;

        let hash = match (&user, DUMMY_HASH.as_deref()) {
            (Some(user), _) => user.password_hash.as_str(),
            (None, Some(dummy)) => dummy,
            (None, None) => return Err(AppError::InvalidCredentials),
        };
        let valid = Password::from_hash(hash.to_string()).verify(password);

        match user {
            Some(user) if valid => Ok(user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.authenticate(&email, &password).await?;
        generate_token(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.access_token_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;

    const SECRET: &str = "unit-test-secret-key-with-32-chars!!";

    fn stored_user(password: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "user@example.com".to_string(),
            Password::new(password).unwrap().into_string(),
            "User".to_string(),
        )
    }

    fn service(repo: MockUserRepository) -> Authenticator {
        Authenticator::new(Arc::new(repo), Config::development(SECRET))
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("password123"))));
        repo.expect_create().never();

        let result = service(repo)
            .register("user@example.com".into(), "password123".into(), "User".into())
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create().times(1).returning(Ok);

        let user = service(repo)
            .register("new@example.com".into(), "password123".into(), "New".into())
            .await
            .unwrap();
        assert_ne!(user.password_hash, "password123");
        assert_eq!(user.roles, vec![UserRole::User]);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("password123"))));

        let result = service(repo).authenticate("user@example.com", "wrong-password").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let result = service(repo).authenticate("ghost@example.com", "password123").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_token_round_trip_copies_identity() {
        let user = stored_user("password123");
        let expected = user.clone();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = service(repo);
        let token = auth
            .login("user@example.com".into(), "password123".into())
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, expected.id);
        assert_eq!(claims.email, expected.email);
        assert_eq!(claims.roles, expected.roles);
    }

    #[tokio::test]
    async fn test_verify_token_rejects_garbage() {
        let result = service(MockUserRepository::new()).verify_token("not-a-jwt");
        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("password123"))));
        repo.expect_create().never();

        let seeded = service(repo)
            .ensure_admin("user@example.com", "Admin", "password123")
            .await
            .unwrap();
        assert!(seeded.is_none());
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_verified_admin() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create().times(1).returning(Ok);

        let admin = service(repo)
            .ensure_admin("admin@example.com", "Admin", "password123")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert!(admin.verified);
    }
}
