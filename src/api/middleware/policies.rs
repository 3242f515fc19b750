//! Policy guard: one (action, subject) check against the caller's ability.

use std::marker::PhantomData;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::CurrentUser;
use crate::errors::AppError;
use crate::policies::{Ability, Action, Subject};

/// A single authorization requirement
pub trait Policy: Send + Sync + 'static {
    const ACTION: Action;
    const SUBJECT: Subject;
}

/// Reading across all subjects; only `admin` holds it.
pub struct ReadAllUsers;

impl Policy for ReadAllUsers {
    const ACTION: Action = Action::Read;
    const SUBJECT: Subject = Subject::All;
}

/// Bearer-authenticated user whose ability satisfies `P`.
///
/// Must run after [`super::auth_middleware`].
pub struct PoliciesGuard<P: Policy>(pub CurrentUser, PhantomData<P>);

#[async_trait]
impl<S, P> FromRequestParts<S> for PoliciesGuard<P>
where
    S: Send + Sync,
    P: Policy,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        Ability::for_user(user.id, &user.roles)
            .check(P::ACTION, P::SUBJECT)
            .inspect_err(|_| tracing::debug!(user_id = %user.id, "Policy check failed"))?;

        Ok(PoliciesGuard(user, PhantomData))
    }
}
