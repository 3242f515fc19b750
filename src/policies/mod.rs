//! Authorization model: abilities derived from user roles.

mod ability;

pub use ability::{Ability, Action, Subject};
