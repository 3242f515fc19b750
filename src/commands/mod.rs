//! One module per CLI command.

pub mod generate;
pub mod matrix;
pub mod migrate;
pub mod new;
pub mod seed;
pub mod serve;
