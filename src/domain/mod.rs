//! Domain types shared by the reference backend.

pub mod password;
pub mod user;

pub use password::Password;
pub use user::{CreateUser, User, UserResponse, UserRole};
