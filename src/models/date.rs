//! Calendar dates on the wire.
//!
//! `date` columns come back as `YYYY-MM-DD`, but rows written by older
//! clients may carry a time of day. Only the date portion is kept.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

pub fn parse(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_is_dropped() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse("2024-03-01"), Some(day));
        assert_eq!(parse("2024-03-01T23:59:59.999+07:00"), Some(day));
        assert_eq!(parse("2024-03"), None);
        assert_eq!(parse("01/03/2024"), None);
    }
}
