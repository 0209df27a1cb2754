//! Bulk-load documents for initial catalog population.
//!
//! A seed is the external source of truth for a catalog instance: it is
//! loaded once, validated row by row against the schema constraints, and
//! any malformed row is fatal. Loading is read-only territory afterwards.

use crate::error::Result;
use crate::types::{ActivityId, BuildingId, OrganizationId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A full seed document.
///
/// # Example
///
/// ```rust
/// use orgdex::Seed;
///
/// let seed = Seed::from_json(r#"{
///     "buildings": [{ "id": 1, "address": "1 Main St", "lat": 55.0, "lon": 37.0 }],
///     "activities": [{ "id": 1, "name": "Food", "level": 1 }],
///     "organizations": [{
///         "id": 1, "name": "Acme", "building_id": 1,
///         "phones": ["2-222-222"], "activity_ids": [1]
///     }]
/// }"#)?;
/// assert_eq!(seed.buildings.len(), 1);
/// # Ok::<(), orgdex::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub buildings: Vec<SeedBuilding>,
    #[serde(default)]
    pub activities: Vec<SeedActivity>,
    #[serde(default)]
    pub organizations: Vec<SeedOrganization>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedBuilding {
    pub id: BuildingId,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedActivity {
    pub id: ActivityId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ActivityId>,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOrganization {
    pub id: OrganizationId,
    pub name: String,
    pub building_id: BuildingId,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub activity_ids: Vec<ActivityId>,
}

impl Seed {
    /// Parse a seed document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a seed document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty() && self.activities.is_empty() && self.organizations.is_empty()
    }
}
