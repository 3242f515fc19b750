//! SeaORM entity definitions, kept apart from the domain models.

pub mod session;
pub mod user;
