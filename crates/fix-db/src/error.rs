//! Store error types for fix-db.

use fix_core::errors::CoreError;
use thiserror::Error;

/// Errors from ticket store operations.
///
/// The store surfaces structured failure kinds only; translating them into
/// user-facing messages is the caller's job.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced ticket, user, or master does not exist (or is inactive
    /// where an active user is required).
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A caller-supplied value is outside its closed domain (bad role value,
    /// non-positive quantity, malformed enumeration string).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::InvalidArgument(msg),
            CoreError::Other(inner) => Self::Other(inner),
        }
    }
}
