//! Error handling for the coopbook data layer

use coopbook_auth::AuthError;
use coopbook_postgrest::PostgrestError;
use thiserror::Error;

use crate::validate::FieldError;

/// Notice shown to the user for any failed remote call.
pub const GENERIC_FAILURE_NOTICE: &str = "Something went wrong. Please try again.";

/// Unified error type for coopbook operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any remote call was made
    #[error("Invalid input: {0}")]
    Validation(#[from] FieldError),

    /// No signed-in user; callers should send the user to the login screen
    #[error("Not signed in")]
    MissingSession,

    /// The provider returned a session this client cannot use
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] PostgrestError),

    /// The row is referenced by other rows and the store refuses to delete it
    #[error("{table} row {id} is still referenced by other records")]
    StillReferenced { table: &'static str, id: String },

    /// An update matched no row visible to the current user
    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<T: std::fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// True for errors raised before anything was sent to the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True when the caller should ask the user to sign in again.
    pub fn requires_sign_in(&self) -> bool {
        match self {
            Error::MissingSession | Error::InvalidSession(_) => true,
            Error::Auth(e) => e.is_rejected(),
            Error::Database(e) => e.status().map_or(false, |s| s.as_u16() == 401),
            _ => false,
        }
    }

    /// Text to show the user. Validation errors name the offending field;
    /// every remote failure collapses to one generic notice.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::MissingSession => "Please sign in to continue.".to_string(),
            Error::StillReferenced { .. } => {
                "This record is still used by other records and cannot be deleted.".to_string()
            }
            _ => GENERIC_FAILURE_NOTICE.to_string(),
        }
    }
}
