use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{remote_failure, Connection};
use crate::error::{Error, Result};
use crate::models::{Draft, Profile, ProfileDraft};
use crate::session::SessionContext;
use crate::validate::FieldError;

const TABLE: &str = "profiles";

#[derive(Serialize)]
struct NewProfile<'a> {
    id: Uuid,
    email: &'a str,
    #[serde(flatten)]
    details: &'a ProfileDraft,
}

/// The signed-in user's own profile row.
#[derive(Debug, Clone)]
pub struct Profiles {
    conn: Connection,
}

impl Profiles {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// `None` until the profile has been created.
    pub async fn get(&self, session: &SessionContext) -> Result<Option<Profile>> {
        let rows = self
            .conn
            .table(TABLE, session)?
            .select("*")
            .eq("id", &session.user_id().to_string())
            .limit(1)
            .execute::<Profile>()
            .await
            .map_err(|e| remote_failure(TABLE, "get", e))?;
        Ok(rows.into_iter().next())
    }

    /// Create the profile for the session's user. Id and email come from the
    /// session.
    pub async fn create(&self, session: &SessionContext, draft: &ProfileDraft) -> Result<Profile> {
        draft.validate()?;
        let email = session
            .user
            .email
            .as_deref()
            .ok_or(FieldError::Missing("email"))?;

        let body = NewProfile {
            id: session.user_id(),
            email,
            details: draft,
        };
        let rows = self
            .conn
            .table(TABLE, session)?
            .insert::<_, Profile>(&body)
            .await
            .map_err(|e| remote_failure(TABLE, "create", e))?;

        let profile = rows.into_iter().next().ok_or_else(|| Error::NotFound {
            table: TABLE,
            id: session.user_id().to_string(),
        })?;
        info!(id = %profile.id, "created profile");
        Ok(profile)
    }

    /// Save the settings form.
    pub async fn update(&self, session: &SessionContext, draft: &ProfileDraft) -> Result<Profile> {
        draft.validate()?;
        let rows = self
            .conn
            .table(TABLE, session)?
            .eq("id", &session.user_id().to_string())
            .update::<_, Profile>(draft)
            .await
            .map_err(|e| remote_failure(TABLE, "update", e))?;

        let profile = rows.into_iter().next().ok_or_else(|| Error::NotFound {
            table: TABLE,
            id: session.user_id().to_string(),
        })?;
        info!(id = %profile.id, "updated profile");
        Ok(profile)
    }
}
