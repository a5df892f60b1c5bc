use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Dated, Draft};
use crate::validate::{self, FieldError, FieldResult};

/// Egg quality assigned when the eggs are recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EggGrade {
    #[default]
    A,
    B,
    C,
}

impl EggGrade {
    pub const ALL: [EggGrade; 3] = [EggGrade::A, EggGrade::B, EggGrade::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            EggGrade::A => "A",
            EggGrade::B => "B",
            EggGrade::C => "C",
        }
    }

    /// Name shown to people, e.g. "Grade A".
    pub fn label(&self) -> String {
        format!("Grade {}", self.as_str())
    }
}

impl fmt::Display for EggGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EggGrade {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(EggGrade::A),
            "B" => Ok(EggGrade::B),
            "C" => Ok(EggGrade::C),
            _ => Err(()),
        }
    }
}

/// One recording event. A batch may have several rows on the same day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggProduction {
    pub id: Uuid,
    pub chicken_id: Uuid,
    #[serde(deserialize_with = "super::date::deserialize")]
    pub date: NaiveDate,
    pub count: i32,
    pub weight: Option<f64>,
    pub quality: EggGrade,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dated for EggProduction {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EggProductionDraft {
    pub chicken_id: Uuid,
    pub date: NaiveDate,
    pub count: i32,
    pub weight: Option<f64>,
    pub quality: EggGrade,
    pub notes: Option<String>,
}

impl Draft for EggProductionDraft {
    fn validate(&self) -> FieldResult<()> {
        validate::non_negative_count("count", self.count)?;
        if let Some(weight) = self.weight {
            validate::non_negative_amount("weight", weight)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EggProductionForm {
    pub chicken_id: String,
    /// Blank means today.
    pub date: String,
    pub count: String,
    pub weight: String,
    pub quality: String,
    pub notes: String,
}

impl EggProductionForm {
    /// Parse the form, filling blank defaults relative to `today`.
    pub fn into_draft(self, today: NaiveDate) -> FieldResult<EggProductionDraft> {
        let draft = EggProductionDraft {
            chicken_id: validate::id("chicken_id", &self.chicken_id)?,
            date: validate::date_or("date", &self.date, today)?,
            count: validate::count("count", &self.count)?,
            weight: validate::optional_amount("weight", &self.weight)?,
            quality: validate::choice("quality", &self.quality, EggGrade::A)?,
            notes: validate::optional_text(&self.notes),
        };
        draft.validate()?;
        Ok(draft)
    }
}

impl TryFrom<EggProductionForm> for EggProductionDraft {
    type Error = FieldError;

    fn try_from(form: EggProductionForm) -> FieldResult<Self> {
        form.into_draft(super::today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_displays_its_column_value() {
        assert_eq!(EggGrade::B.to_string(), "B");
        assert_eq!(EggGrade::B.label(), "Grade B");
        assert_eq!("b".parse::<EggGrade>(), Ok(EggGrade::B));
    }

    #[test]
    fn test_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let chicken = Uuid::new_v4();
        let draft = EggProductionForm {
            chicken_id: chicken.to_string(),
            count: "850".to_string(),
            notes: "   ".to_string(),
            ..Default::default()
        }
        .into_draft(today)
        .unwrap();

        assert_eq!(draft.chicken_id, chicken);
        assert_eq!(draft.date, today);
        assert_eq!(draft.count, 850);
        assert_eq!(draft.quality, EggGrade::A);
        assert_eq!(draft.weight, None);
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn test_requires_chicken() {
        let err = EggProductionForm {
            count: "10".to_string(),
            ..Default::default()
        }
        .into_draft(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        .unwrap_err();
        assert_eq!(err, FieldError::Missing("chicken_id"));
    }

    #[test]
    fn test_row_with_time_of_day() {
        let row: EggProduction = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "chicken_id": Uuid::new_v4(),
            "date": "2024-03-01T06:30:00",
            "count": 150,
            "weight": null,
            "quality": "B",
            "notes": null,
            "created_at": "2024-03-01T06:31:00+00:00"
        }))
        .unwrap();
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(row.quality, EggGrade::B);
    }
}
