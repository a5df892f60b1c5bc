use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Draft;
use crate::validate::{self, FieldError, FieldResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coop {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The owner is never part of the draft; it comes from the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoopDraft {
    pub name: String,
    pub capacity: i32,
}

impl Draft for CoopDraft {
    fn validate(&self) -> FieldResult<()> {
        validate::present("name", &self.name)?;
        validate::positive_count("capacity", self.capacity)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoopForm {
    pub name: String,
    pub capacity: String,
}

impl TryFrom<CoopForm> for CoopDraft {
    type Error = FieldError;

    fn try_from(form: CoopForm) -> FieldResult<Self> {
        let draft = Self {
            name: validate::required("name", &form.name)?,
            capacity: validate::count("capacity", &form.capacity)?,
        };
        draft.validate()?;
        Ok(draft)
    }
}
