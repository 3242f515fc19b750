//! Guards: bearer token, session and policy checks.

mod auth;
mod policies;
mod session;

pub use auth::{auth_middleware, CurrentUser};
pub use policies::{PoliciesGuard, Policy, ReadAllUsers};
pub use session::{SessionUser, current_user, is_logged_in, login};
