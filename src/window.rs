//! Reporting windows.
//!
//! Every report runs over an explicit inclusive date range. The presets
//! resolve against a caller-supplied "today" so they stay testable.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound used for "all time" (0001-01-01), far before any farm record.
pub fn earliest() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportWindow {
    SevenDay,
    #[default]
    ThirtyDay,
    AllTime,
}

impl ReportWindow {
    /// Resolve against `today`. The range always ends today.
    pub fn bounds(&self, today: NaiveDate) -> DateRange {
        let start = match self {
            ReportWindow::SevenDay => today.checked_sub_days(Days::new(7)),
            ReportWindow::ThirtyDay => today.checked_sub_days(Days::new(30)),
            ReportWindow::AllTime => None,
        };
        DateRange::new(start.unwrap_or_else(earliest), today)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportWindow::SevenDay => "7d",
            ReportWindow::ThirtyDay => "30d",
            ReportWindow::AllTime => "all",
        }
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report window {0:?}, expected one of 7d, 30d, all")]
pub struct UnknownWindow(pub String);

impl FromStr for ReportWindow {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" | "week" => Ok(ReportWindow::SevenDay),
            "30d" | "month" => Ok(ReportWindow::ThirtyDay),
            "all" => Ok(ReportWindow::AllTime),
            other => Err(UnknownWindow(other.to_string())),
        }
    }
}
