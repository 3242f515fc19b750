//! Session authentication. Anonymous requests are sent to the login page.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::CurrentUser;
use crate::config::{LOGIN_ROUTE, SESSION_USER_KEY};
use crate::domain::User;
use crate::errors::AppResult;

/// Session-authenticated user
pub struct SessionUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match current_user(&session).await {
            Some(user) => Ok(SessionUser(user)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "Anonymous request redirected to login");
                Err(Redirect::to(LOGIN_ROUTE).into_response())
            }
        }
    }
}

/// The user stored in `session`, if any. Unreadable entries count as anonymous.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session.get(SESSION_USER_KEY).await.ok().flatten()
}

pub async fn is_logged_in(session: &Session) -> bool {
    current_user(session).await.is_some()
}

/// Store `user` in a fresh session id.
pub async fn login(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, CurrentUser::from(user)).await?;
    Ok(())
}
