//! backend-forge - scaffolds authenticated web backends.
//!
//! Given a database engine, an authentication strategy and an authorization
//! model, [`scaffold`] selects template components, wires their modules,
//! routes and dependencies together, and writes a project that builds as-is.
//!
//! The crate also runs the backend those templates describe (`forge serve`):
//!
//! - **cli** / **commands**: argument parsing and command implementations
//! - **config** / **errors**: environment configuration and the error type
//! - **domain**, **infra**, **services**: users, persistence, authentication
//! - **policies**: role-derived abilities
//! - **api**: router, guards, handlers, views
//!
//! ```bash
//! forge new shop --database postgresql --auth local --authz policies
//! forge generate resource product --path shop
//! forge matrix
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod policies;
pub mod scaffold;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
