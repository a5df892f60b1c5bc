use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Dated, Draft};
use crate::validate::{self, FieldError, FieldResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthEventKind {
    #[default]
    Vaccination,
    Treatment,
    Checkup,
}

impl HealthEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthEventKind::Vaccination => "vaccination",
            HealthEventKind::Treatment => "treatment",
            HealthEventKind::Checkup => "checkup",
        }
    }
}

impl fmt::Display for HealthEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthEventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vaccination" => Ok(HealthEventKind::Vaccination),
            "treatment" => Ok(HealthEventKind::Treatment),
            "checkup" => Ok(HealthEventKind::Checkup),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Uuid,
    pub chicken_id: Uuid,
    #[serde(deserialize_with = "super::date::deserialize")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HealthEventKind,
    pub description: String,
    pub cost: f64,
    pub vet_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dated for HealthRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRecordDraft {
    pub chicken_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HealthEventKind,
    pub description: String,
    pub cost: f64,
    pub vet_name: Option<String>,
}

impl Draft for HealthRecordDraft {
    fn validate(&self) -> FieldResult<()> {
        validate::present("description", &self.description)?;
        validate::non_negative_amount("cost", self.cost)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HealthRecordForm {
    pub chicken_id: String,
    pub date: String,
    pub kind: String,
    pub description: String,
    pub cost: String,
    pub vet_name: String,
}

impl HealthRecordForm {
    pub fn into_draft(self, today: NaiveDate) -> FieldResult<HealthRecordDraft> {
        let draft = HealthRecordDraft {
            chicken_id: validate::id("chicken_id", &self.chicken_id)?,
            date: validate::date_or("date", &self.date, today)?,
            kind: validate::choice("type", &self.kind, HealthEventKind::Vaccination)?,
            description: validate::required("description", &self.description)?,
            cost: validate::amount("cost", &self.cost)?,
            vet_name: validate::optional_text(&self.vet_name),
        };
        draft.validate()?;
        Ok(draft)
    }
}

impl TryFrom<HealthRecordForm> for HealthRecordDraft {
    type Error = FieldError;

    fn try_from(form: HealthRecordForm) -> FieldResult<Self> {
        form.into_draft(super::today())
    }
}
