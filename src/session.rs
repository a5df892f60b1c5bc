//! The signed-in user's session, held by the caller and passed to every
//! record call.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::{Error, Result};

/// The user a session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Session data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp
    pub expires_at: Option<i64>,
    pub user: CurrentUser,
}

impl SessionContext {
    /// Build a session from tokens obtained elsewhere.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: CurrentUser,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
            user,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::from_secs(0))
                    .as_secs() as i64;
                now >= expires_at
            }
            None => false,
        }
    }

    /// The access token, or `MissingSession` when there is none to send.
    pub(crate) fn token(&self) -> Result<&str> {
        if self.access_token.trim().is_empty() {
            return Err(Error::MissingSession);
        }
        Ok(&self.access_token)
    }

    /// The access token for an authorized call. An expired session is
    /// `InvalidSession` and has to be refreshed first.
    pub(crate) fn bearer(&self) -> Result<&str> {
        let token = self.token()?;
        if self.is_expired() {
            return Err(Error::InvalidSession("session has expired".to_string()));
        }
        Ok(token)
    }

    /// Turn an optional caller-held session into the session a call needs.
    pub fn require(session: Option<&SessionContext>) -> Result<&SessionContext> {
        session.ok_or(Error::MissingSession)
    }
}

impl TryFrom<coopbook_auth::Session> for SessionContext {
    type Error = Error;

    fn try_from(session: coopbook_auth::Session) -> Result<Self> {
        let id = Uuid::parse_str(&session.user.id).map_err(|_| {
            Error::InvalidSession(format!("user id {:?} is not a UUID", session.user.id))
        })?;
        Ok(Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at,
            user: CurrentUser {
                id,
                email: session.user.email,
            },
        })
    }
}
