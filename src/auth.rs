//! Pluggable authentication capability.
//!
//! The catalog itself has no authorization concept; a transport layer runs
//! one of these before invoking catalog logic. The trait keeps query code
//! independent of the concrete mechanism.

use crate::error::{CatalogError, Result};

/// Decides whether a presented credential may reach the catalog.
pub trait Authenticator: Send + Sync {
    /// `presented` is the credential extracted from the request, if any.
    fn authenticate(&self, presented: Option<&str>) -> Result<()>;
}

/// Pre-shared static key check.
#[derive(Debug, Clone)]
pub struct StaticKeyAuth {
    key: String,
}

impl StaticKeyAuth {
    /// Rejects an empty key at construction rather than silently accepting
    /// every request that omits the header.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CatalogError::InvalidInput(
                "static API key cannot be empty".into(),
            ));
        }
        Ok(Self { key })
    }
}

impl Authenticator for StaticKeyAuth {
    fn authenticate(&self, presented: Option<&str>) -> Result<()> {
        match presented {
            Some(candidate) if candidate == self.key => Ok(()),
            Some(_) => Err(CatalogError::Unauthorized("invalid API key".into())),
            None => Err(CatalogError::Unauthorized("missing API key".into())),
        }
    }
}

/// Accepts everything. For embedded use where the host process is trusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl Authenticator for NoAuth {
    fn authenticate(&self, _presented: Option<&str>) -> Result<()> {
        Ok(())
    }
}
