use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Dated, Draft};
use crate::validate::{self, FieldError, FieldResult};

/// One feeding event for a coop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub id: Uuid,
    pub coop_id: Uuid,
    #[serde(deserialize_with = "super::date::deserialize")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub feed_type: String,
    pub quantity_kg: f64,
    pub cost: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dated for Feed {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedDraft {
    pub coop_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub feed_type: String,
    pub quantity_kg: f64,
    pub cost: f64,
    pub notes: Option<String>,
}

impl Draft for FeedDraft {
    fn validate(&self) -> FieldResult<()> {
        validate::present("type", &self.feed_type)?;
        validate::non_negative_amount("quantity_kg", self.quantity_kg)?;
        validate::non_negative_amount("cost", self.cost)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedForm {
    pub coop_id: String,
    pub date: String,
    pub feed_type: String,
    pub quantity_kg: String,
    pub cost: String,
    pub notes: String,
}

impl FeedForm {
    pub fn into_draft(self, today: NaiveDate) -> FieldResult<FeedDraft> {
        let draft = FeedDraft {
            coop_id: validate::id("coop_id", &self.coop_id)?,
            date: validate::date_or("date", &self.date, today)?,
            feed_type: validate::required("type", &self.feed_type)?,
            quantity_kg: validate::amount("quantity_kg", &self.quantity_kg)?,
            cost: validate::amount("cost", &self.cost)?,
            notes: validate::optional_text(&self.notes),
        };
        draft.validate()?;
        Ok(draft)
    }
}

impl TryFrom<FeedForm> for FeedDraft {
    type Error = FieldError;

    fn try_from(form: FeedForm) -> FieldResult<Self> {
        form.into_draft(super::today())
    }
}
