use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Draft;
use crate::validate::{self, FieldError, FieldResult};

/// Batch status. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChickenStatus {
    #[default]
    Active,
    Sold,
    Dead,
}

impl ChickenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChickenStatus::Active => "active",
            ChickenStatus::Sold => "sold",
            ChickenStatus::Dead => "dead",
        }
    }
}

impl fmt::Display for ChickenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChickenStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(ChickenStatus::Active),
            "sold" => Ok(ChickenStatus::Sold),
            "dead" => Ok(ChickenStatus::Dead),
            _ => Err(()),
        }
    }
}

/// A batch of chickens tracked as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chicken {
    pub id: Uuid,
    pub coop_id: Option<Uuid>,
    pub batch_number: String,
    pub breed: String,
    pub initial_count: i32,
    pub current_count: i32,
    #[serde(deserialize_with = "super::date::deserialize")]
    pub birth_date: NaiveDate,
    pub status: ChickenStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chicken {
    pub fn is_active(&self) -> bool {
        self.status == ChickenStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChickenDraft {
    pub coop_id: Option<Uuid>,
    pub batch_number: String,
    pub breed: String,
    pub initial_count: i32,
    pub current_count: i32,
    pub birth_date: NaiveDate,
    pub status: ChickenStatus,
}

impl Draft for ChickenDraft {
    fn validate(&self) -> FieldResult<()> {
        validate::present("batch_number", &self.batch_number)?;
        validate::present("breed", &self.breed)?;
        validate::non_negative_count("initial_count", self.initial_count)?;
        validate::non_negative_count("current_count", self.current_count)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChickenForm {
    /// Blank leaves the batch without a coop.
    pub coop_id: String,
    pub batch_number: String,
    pub breed: String,
    pub initial_count: String,
    /// Blank means "same as initial_count".
    pub current_count: String,
    pub birth_date: String,
    pub status: String,
}

impl TryFrom<ChickenForm> for ChickenDraft {
    type Error = FieldError;

    fn try_from(form: ChickenForm) -> FieldResult<Self> {
        let initial_count = validate::count("initial_count", &form.initial_count)?;
        let current_count = if form.current_count.trim().is_empty() {
            initial_count
        } else {
            validate::count("current_count", &form.current_count)?
        };

        let draft = Self {
            coop_id: validate::optional_id("coop_id", &form.coop_id)?,
            batch_number: validate::required("batch_number", &form.batch_number)?,
            breed: validate::required("breed", &form.breed)?,
            initial_count,
            current_count,
            birth_date: validate::date("birth_date", &form.birth_date)?,
            status: validate::choice("status", &form.status, ChickenStatus::Active)?,
        };
        draft.validate()?;
        Ok(draft)
    }
}
