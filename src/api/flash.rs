//! One-shot messages carried in the session until the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::config::SESSION_FLASH_KEY;
use crate::errors::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Queue a message for the next page.
pub async fn push(session: &Session, kind: FlashKind, message: impl Into<String>) -> AppResult<()> {
    let mut pending: Vec<Flash> = session.get(SESSION_FLASH_KEY).await?.unwrap_or_default();
    pending.push(Flash::new(kind, message));
    session.insert(SESSION_FLASH_KEY, pending).await?;
    Ok(())
}

/// Drain pending messages.
pub async fn take(session: &Session) -> AppResult<Vec<Flash>> {
    Ok(session
        .remove::<Vec<Flash>>(SESSION_FLASH_KEY)
        .await?
        .unwrap_or_default())
}
