//! Error types for orgdex.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors produced by catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A single-entity lookup missed. Surfaced as a 404-equivalent by callers.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input rejected before any query work (out-of-range coordinates,
    /// non-positive radius, out-of-range level filter).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A row violates schema integrity (duplicate key, dangling foreign key,
    /// level out of range or inconsistent with the parent). Fatal at seed
    /// load time.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Request failed the authentication capability.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// I/O failure while reading a seed document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed seed or configuration document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for internal invariant breaks.
    #[error("{0}")]
    Other(String),
}

impl CatalogError {
    pub(crate) fn not_found(entity: &str, id: i64) -> Self {
        CatalogError::NotFound(format!("{} {}", entity, id))
    }
}
