//! Infrastructure layer: database connection, migrations, repositories and
//! the session store.

pub mod db;
pub mod repositories;

pub use db::{Database, MigrationState, Migrator};
pub use repositories::{DbSessionStore, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
