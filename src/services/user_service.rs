//! User lookups backing `/users` and `/profile`.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Message of the not-found response for a missing user
pub const USER_NOT_FOUND: &str = "The user does not exist";

#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetch one user; absence is a not-found error.
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// All verified users
    async fn list_verified(&self) -> AppResult<Vec<User>>;
}

/// [`UserService`] over a [`UserRepository`]
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
    }

    async fn list_verified(&self) -> AppResult<Vec<User>> {
        self.users.list_verified().await
    }
}
