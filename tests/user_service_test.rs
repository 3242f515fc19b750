//! Service-level tests over an in-memory repository.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use backend_forge::config::Config;
use backend_forge::domain::{User, UserRole};
use backend_forge::errors::{AppError, AppResult};
use backend_forge::infra::UserRepository;
use backend_forge::services::{AuthService, Authenticator, UserManager, UserService, USER_NOT_FOUND};

const SECRET: &str = "service-test-secret-key-with-32-chars";

#[derive(Default)]
struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: User) -> AppResult<User> {
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn list_verified(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().iter().filter(|u| u.verified).cloned().collect())
    }
}

fn services() -> (Authenticator, UserManager) {
    let repo = Arc::new(InMemoryUsers::default());
    (
        Authenticator::new(repo.clone(), Config::development(SECRET)),
        UserManager::new(repo),
    )
}

#[tokio::test]
async fn test_registered_user_is_retrievable() {
    let (auth, users) = services();

    let registered = auth
        .register("new@example.com".into(), "password123".into(), "New".into())
        .await
        .unwrap();
    let fetched = users.get_user(registered.id).await.unwrap();

    assert_eq!(fetched.email, "new@example.com");
    assert_eq!(fetched.roles, vec![UserRole::User]);
    assert!(!fetched.verified);
}

#[tokio::test]
async fn test_missing_user_message() {
    let (_, users) = services();

    let err = users.get_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFoundWithMessage(_)));
    assert_eq!(err.to_string(), USER_NOT_FOUND);
}

#[tokio::test]
async fn test_unverified_users_are_not_listed() {
    let (auth, users) = services();

    auth.register("pending@example.com".into(), "password123".into(), "Pending".into())
        .await
        .unwrap();
    let admin = auth
        .ensure_admin("admin@example.com", "Admin", "password123")
        .await
        .unwrap()
        .unwrap();

    let listed = users.list_verified().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, admin.id);
}

#[tokio::test]
async fn test_seeded_admin_can_log_in() {
    let (auth, _) = services();

    auth.ensure_admin("admin@example.com", "Admin", "password123")
        .await
        .unwrap();
    assert!(auth
        .ensure_admin("admin@example.com", "Admin", "password123")
        .await
        .unwrap()
        .is_none());

    let token = auth
        .login("admin@example.com".into(), "password123".into())
        .await
        .unwrap();
    let claims = auth.verify_token(&token.access_token).unwrap();
    assert!(claims.roles.contains(&UserRole::Admin));
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let (auth, _) = services();
    auth.register("user@example.com".into(), "password123".into(), "User".into())
        .await
        .unwrap();
    let token = auth
        .login("user@example.com".into(), "password123".into())
        .await
        .unwrap();

    let other = Authenticator::new(
        Arc::new(InMemoryUsers::default()),
        Config::development("a-completely-different-secret-value"),
    );
    assert!(matches!(
        other.verify_token(&token.access_token),
        Err(AppError::Jwt(_))
    ));
}
