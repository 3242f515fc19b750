//! Seed command - creates the administrator account once.

use std::sync::Arc;

use crate::config::{Config, DEFAULT_SEED_ADMIN_NAME};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, UserStore};
use crate::services::Authenticator;

pub async fn execute(config: Config) -> AppResult<()> {
    let password = config
        .seed_admin_password()
        .ok_or_else(|| AppError::validation("SEED_ADMIN_PASSWORD must be set to seed an admin"))?
        .to_string();

    let database = Database::connect(&config).await?;
    let users = Arc::new(UserStore::new(database.get_connection()));
    let email = config.seed_admin_email.clone();
    let auth = Authenticator::new(users, config);

    match auth.ensure_admin(&email, DEFAULT_SEED_ADMIN_NAME, &password).await? {
        Some(admin) => println!("Seeded admin {} ({})", admin.email, admin.id),
        None => println!("Admin {} already exists", email),
    }

    Ok(())
}
