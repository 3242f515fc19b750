//! Backend project generator.
//!
//! An option set ([`ScaffoldOptions`]) selects components from the compiled-in
//! [`catalog`]; the [`Plan`] lays their templates out, derives the wiring,
//! renders everything and verifies the result before the [`writer`] touches
//! the disk. The written project carries a [`Manifest`] so [`resource`] can
//! extend it later.

pub mod catalog;
pub mod manifest;
pub mod naming;
pub mod options;
pub mod plan;
pub mod render;
pub mod resource;
pub mod wiring;
pub mod writer;

pub use manifest::Manifest;
pub use options::{AuthKind, AuthStrategy, Authorization, Database, ScaffoldOptions, StorageKind};
pub use plan::{Override, Plan, PlannedFile};
pub use render::Secrets;
pub use resource::{generate_resource, ResourceReport};
pub use writer::{write_plan, WriteMode, WriteReport};
