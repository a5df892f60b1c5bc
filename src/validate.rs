//! Form input parsing and field checks.
//!
//! Every create/update goes through these before a request is built, so a
//! malformed form never reaches the store.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be a whole number, got {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{field} must be a date (YYYY-MM-DD), got {value:?}")]
    NotADate { field: &'static str, value: String },

    #[error("{field} must reference an existing record, got {value:?}")]
    NotAnId { field: &'static str, value: String },

    #[error("{field} has unknown value {value:?}")]
    UnknownVariant { field: &'static str, value: String },
}

pub type FieldResult<T> = std::result::Result<T, FieldError>;

/// Trimmed, non-empty text.
pub fn required(field: &'static str, value: &str) -> FieldResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Missing(field));
    }
    Ok(value.to_string())
}

/// Blank text becomes `None`.
pub fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn count(field: &'static str, value: &str) -> FieldResult<i32> {
    let raw = required(field, value)?;
    let parsed = raw.parse::<i32>().map_err(|_| FieldError::NotAnInteger {
        field,
        value: raw.clone(),
    })?;
    non_negative_count(field, parsed)
}

pub fn amount(field: &'static str, value: &str) -> FieldResult<f64> {
    let raw = required(field, value)?;
    let parsed = raw.parse::<f64>().map_err(|_| FieldError::NotANumber {
        field,
        value: raw.clone(),
    })?;
    non_negative_amount(field, parsed)
}

/// Blank means "not recorded"; anything else must be a valid amount.
pub fn optional_amount(field: &'static str, value: &str) -> FieldResult<Option<f64>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    amount(field, value).map(Some)
}

pub fn date(field: &'static str, value: &str) -> FieldResult<NaiveDate> {
    let raw = required(field, value)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| FieldError::NotADate { field, value: raw })
}

/// Blank falls back to `default`.
pub fn date_or(field: &'static str, value: &str, default: NaiveDate) -> FieldResult<NaiveDate> {
    if value.trim().is_empty() {
        return Ok(default);
    }
    date(field, value)
}

pub fn id(field: &'static str, value: &str) -> FieldResult<Uuid> {
    let raw = required(field, value)?;
    Uuid::parse_str(&raw).map_err(|_| FieldError::NotAnId { field, value: raw })
}

/// Blank means "no reference".
pub fn optional_id(field: &'static str, value: &str) -> FieldResult<Option<Uuid>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    id(field, value).map(Some)
}

/// Parse an enumerated value; blank falls back to `default`.
pub fn choice<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
    default: T,
) -> FieldResult<T> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    value.parse().map_err(|_| FieldError::UnknownVariant {
        field,
        value: value.to_string(),
    })
}

pub fn non_negative_count(field: &'static str, value: i32) -> FieldResult<i32> {
    if value < 0 {
        return Err(FieldError::Negative(field));
    }
    Ok(value)
}

pub fn positive_count(field: &'static str, value: i32) -> FieldResult<i32> {
    if value <= 0 {
        return Err(FieldError::NotPositive(field));
    }
    Ok(value)
}

pub fn non_negative_amount(field: &'static str, value: f64) -> FieldResult<f64> {
    if !value.is_finite() {
        return Err(FieldError::NotANumber {
            field,
            value: value.to_string(),
        });
    }
    if value < 0.0 {
        return Err(FieldError::Negative(field));
    }
    Ok(value)
}

pub fn present(field: &'static str, value: &str) -> FieldResult<()> {
    if value.trim().is_empty() {
        return Err(FieldError::Missing(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count() {
        assert_eq!(count("count", " 850 "), Ok(850));
        assert_eq!(count("count", ""), Err(FieldError::Missing("count")));
        assert_eq!(count("count", "-1"), Err(FieldError::Negative("count")));
        assert_eq!(
            count("count", "12.5"),
            Err(FieldError::NotAnInteger {
                field: "count",
                value: "12.5".to_string()
            })
        );
    }

    #[test]
    fn test_amount() {
        assert_eq!(amount("cost", "1500.50"), Ok(1500.5));
        assert_eq!(amount("cost", "-3"), Err(FieldError::Negative("cost")));
        assert!(matches!(
            amount("cost", "abc"),
            Err(FieldError::NotANumber { .. })
        ));
        assert!(matches!(
            amount("cost", "NaN"),
            Err(FieldError::NotANumber { .. })
        ));
        assert!(matches!(
            amount("cost", "inf"),
            Err(FieldError::NotANumber { .. })
        ));
        assert_eq!(optional_amount("weight", "  "), Ok(None));
        assert_eq!(optional_amount("weight", "61.5"), Ok(Some(61.5)));
    }

    #[test]
    fn test_dates() {
        let fallback = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(date_or("date", "", fallback), Ok(fallback));
        assert_eq!(
            date("date", "2024-02-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(matches!(
            date("date", "2023-02-29"),
            Err(FieldError::NotADate { .. })
        ));
    }

    #[test]
    fn test_ids() {
        let coop = Uuid::new_v4();
        assert_eq!(optional_id("coop", ""), Ok(None));
        assert_eq!(optional_id("coop", &coop.to_string()), Ok(Some(coop)));
        assert_eq!(id("chicken", ""), Err(FieldError::Missing("chicken")));
        assert!(matches!(id("chicken", "12"), Err(FieldError::NotAnId { .. })));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("  "), None);
        assert_eq!(optional_text(" Pak Budi "), Some("Pak Budi".to_string()));
    }
}
