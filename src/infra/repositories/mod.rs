//! Repository layer - data access behind traits.

pub(crate) mod entities;
mod session_store;
mod user_repository;

pub use session_store::DbSessionStore;
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
