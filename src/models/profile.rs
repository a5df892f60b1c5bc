use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Draft;
use crate::validate::{optional_text, FieldResult};

/// One row per signed-up user; `id` is the auth user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub farm_name: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable part of a profile (the settings form).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileDraft {
    pub farm_name: Option<String>,
    pub location: Option<String>,
}

impl Draft for ProfileDraft {
    fn validate(&self) -> FieldResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub farm_name: String,
    pub location: String,
}

impl From<ProfileForm> for ProfileDraft {
    fn from(form: ProfileForm) -> Self {
        Self {
            farm_name: optional_text(&form.farm_name),
            location: optional_text(&form.location),
        }
    }
}
