//! Command-line interface.
//!
//! - `new` / `matrix` / `generate` - the project generator
//! - `serve` / `migrate` / `seed` - the reference backend

pub mod args;

pub use args::{Cli, Commands};
