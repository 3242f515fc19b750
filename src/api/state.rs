//! Application state shared by every handler.

use std::sync::Arc;

use tower_sessions::cookie::Key;

use super::views::Views;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, UserStore};
use crate::services::{AuthService, Authenticator, UserManager, UserService};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub views: Arc<Views>,
    pub config: Arc<Config>,
    /// Signs the session cookie
    pub session_key: Key,
    database: Option<Arc<Database>>,
}

impl AppState {
    /// Wire the SeaORM-backed services over `database`.
    pub fn from_config(database: Arc<Database>, config: Config) -> AppResult<Self> {
        let users = Arc::new(UserStore::new(database.get_connection()));
        let auth_service = Arc::new(Authenticator::new(users.clone(), config.clone()));
        let user_service = Arc::new(UserManager::new(users));

        Ok(Self::new(auth_service, user_service, config)?.with_database(database))
    }

    /// State over injected services, without a database handle.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        config: Config,
    ) -> AppResult<Self> {
        let session_key = Key::try_from(config.session_secret_bytes())
            .map_err(|e| AppError::validation(format!("Invalid SESSION_SECRET: {}", e)))?;

        Ok(Self {
            auth_service,
            user_service,
            views: Arc::new(Views::new()?),
            config: Arc::new(config),
            session_key,
            database: None,
        })
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn database(&self) -> Option<&Arc<Database>> {
        self.database.as_ref()
    }
}
