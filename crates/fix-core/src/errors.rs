//! Cross-cutting error types for Fixline.
//!
//! Domain-specific errors (e.g., `StoreError`, `ConfigError`) are defined in
//! their respective crates. `CoreError` covers failures that originate in the
//! core types themselves, mainly enum parsing at call boundaries.

use thiserror::Error;

/// Errors raised by the core types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (unknown enum string, malformed value).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
