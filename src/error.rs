//! Error types shared by the persistence gateway, the entity store, and the
//! schedule dashboard.
//!
//! Three kinds of failure exist and they never mix: a missing identifier is not
//! an error at all (stores answer with `None`/`false`), a broken store surfaces
//! as [`StoreError`], and a business rule saying "no" surfaces as
//! [`Rejection`].

use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by a persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Reading or writing the local document store failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The local document (or a JSON column) could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be mapped back onto the entity shape.
    #[error("Invalid stored value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Business-rule rejections raised while assembling a schedule. No partial
/// effect is ever applied when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("\"{song}\" is already in this schedule.")]
    DuplicateSong { song: String },

    #[error("{member} is already assigned to {instrument}.")]
    DuplicateAssignment { member: String, instrument: String },

    #[error("{member} is not available on {date}.")]
    Unavailable { member: String, date: NaiveDate },
}

/// Everything a dashboard mutation can fail with.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DashboardError {
    /// The rejection carried by this error, if it is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DashboardError::Rejected(rejection) => Some(rejection),
            DashboardError::Store(_) => None,
        }
    }
}
