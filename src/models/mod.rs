//! Row types for the farm tables and the drafts used to write them.
//!
//! Each table has three shapes:
//!
//! - the row as stored (`Coop`, `Sale`, ...), deserialized from the store
//! - a `*Draft`, the typed payload of a create or update
//! - a `*Form`, raw text as typed by the user, parsed into a draft

pub mod chicken;
pub mod coop;
pub mod date;
pub mod feed;
pub mod health;
pub mod production;
pub mod profile;
pub mod sale;

use chrono::NaiveDate;
use serde::Serialize;

use crate::validate::FieldResult;

pub use chicken::{Chicken, ChickenDraft, ChickenForm, ChickenStatus};
pub use coop::{Coop, CoopDraft, CoopForm};
pub use feed::{Feed, FeedDraft, FeedForm};
pub use health::{HealthEventKind, HealthRecord, HealthRecordDraft, HealthRecordForm};
pub use production::{EggGrade, EggProduction, EggProductionDraft, EggProductionForm};
pub use profile::{Profile, ProfileDraft, ProfileForm};
pub use sale::{Sale, SaleDraft, SaleForm, SaleStatus};

/// A create/update payload.
pub trait Draft: Serialize + Send + Sync {
    /// Checks the invariants the store would otherwise reject.
    fn validate(&self) -> FieldResult<()>;
}

/// Rows recorded against a calendar day.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
