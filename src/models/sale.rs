use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Dated, Draft};
use crate::validate::{self, FieldError, FieldResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    #[default]
    Completed,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(SaleStatus::Pending),
            "completed" => Ok(SaleStatus::Completed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    #[serde(deserialize_with = "super::date::deserialize")]
    pub date: NaiveDate,
    pub egg_count: i32,
    pub price_per_unit: f64,
    pub total: f64,
    pub customer: Option<String>,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    pub fn is_completed(&self) -> bool {
        self.status == SaleStatus::Completed
    }
}

impl Dated for Sale {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A sale to write. `total` is not an input: it is derived from the count
/// and unit price every time the draft is serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "SalePayload")]
pub struct SaleDraft {
    pub date: NaiveDate,
    pub egg_count: i32,
    pub price_per_unit: f64,
    pub customer: Option<String>,
    pub status: SaleStatus,
}

impl SaleDraft {
    pub fn total(&self) -> f64 {
        f64::from(self.egg_count) * self.price_per_unit
    }
}

#[derive(Serialize)]
struct SalePayload {
    date: NaiveDate,
    egg_count: i32,
    price_per_unit: f64,
    total: f64,
    customer: Option<String>,
    status: SaleStatus,
}

impl From<SaleDraft> for SalePayload {
    fn from(draft: SaleDraft) -> Self {
        Self {
            total: draft.total(),
            date: draft.date,
            egg_count: draft.egg_count,
            price_per_unit: draft.price_per_unit,
            customer: draft.customer,
            status: draft.status,
        }
    }
}

impl Draft for SaleDraft {
    fn validate(&self) -> FieldResult<()> {
        validate::non_negative_count("egg_count", self.egg_count)?;
        validate::non_negative_amount("price_per_unit", self.price_per_unit)?;
        validate::non_negative_amount("total", self.total())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SaleForm {
    pub date: String,
    pub egg_count: String,
    pub price_per_unit: String,
    pub customer: String,
    pub status: String,
}

impl SaleForm {
    pub fn into_draft(self, today: NaiveDate) -> FieldResult<SaleDraft> {
        let draft = SaleDraft {
            date: validate::date_or("date", &self.date, today)?,
            egg_count: validate::count("egg_count", &self.egg_count)?,
            price_per_unit: validate::amount("price_per_unit", &self.price_per_unit)?,
            customer: validate::optional_text(&self.customer),
            status: validate::choice("status", &self.status, SaleStatus::Completed)?,
        };
        draft.validate()?;
        Ok(draft)
    }
}

impl TryFrom<SaleForm> for SaleDraft {
    type Error = FieldError;

    fn try_from(form: SaleForm) -> FieldResult<Self> {
        form.into_draft(super::today())
    }
}
