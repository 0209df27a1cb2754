//! Entity rows, read models, and configuration for orgdex.
//!
//! Rows are plain structs keyed by surrogate ids; relationships live in
//! derived indexes inside the store, not in the rows themselves. Read models
//! are the serializable shapes an API layer returns, with related records
//! eagerly attached.

use crate::spatial::DistanceMetric;
use geo::Point;
use serde::{Deserialize, Serialize};

/// Surrogate key of a building row.
pub type BuildingId = i64;
/// Surrogate key of an activity row.
pub type ActivityId = i64;
/// Surrogate key of an organization row.
pub type OrganizationId = i64;
/// Surrogate key of a phone row.
pub type PhoneId = i64;

/// Maximum depth of the activity taxonomy. Roots are level 1.
pub const MAX_ACTIVITY_LEVEL: u8 = 3;

/// A building with a geographic point location (SRID 4326 semantics:
/// x = longitude, y = latitude, distances are geodesic).
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: BuildingId,
    pub address: String,
    pub location: Point,
}

impl Building {
    pub fn new(id: BuildingId, address: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id,
            address: address.into(),
            location: Point::new(lon, lat),
        }
    }

    /// Latitude projected from the location point.
    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    /// Longitude projected from the location point.
    pub fn lon(&self) -> f64 {
        self.location.x()
    }
}

/// A node in the activity taxonomy. The taxonomy is a forest up to
/// [`MAX_ACTIVITY_LEVEL`] deep; `parent_id` is the owning column and the
/// children lists are derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub parent_id: Option<ActivityId>,
    pub level: u8,
}

impl Activity {
    pub fn new(
        id: ActivityId,
        name: impl Into<String>,
        parent_id: Option<ActivityId>,
        level: u8,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            level,
        }
    }
}

/// An organization occupying a building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub building_id: BuildingId,
}

impl Organization {
    pub fn new(id: OrganizationId, name: impl Into<String>, building_id: BuildingId) -> Self {
        Self {
            id,
            name: name.into(),
            building_id,
        }
    }
}

/// A phone number exclusively owned by one organization; deleted with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationPhone {
    pub id: PhoneId,
    pub org_id: OrganizationId,
    pub phone: String,
}

// ===== Read models =====

/// A building row projected for callers: derived `lat`/`lon` instead of the
/// raw point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: BuildingId,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&Building> for BuildingRecord {
    fn from(b: &Building) -> Self {
        Self {
            id: b.id,
            address: b.address.clone(),
            lat: b.lat(),
            lon: b.lon(),
        }
    }
}

/// A flat activity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub name: String,
    pub parent_id: Option<ActivityId>,
    pub level: u8,
}

impl From<&Activity> for ActivityRecord {
    fn from(a: &Activity) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            parent_id: a.parent_id,
            level: a.level,
        }
    }
}

/// An activity with its subtree of children eagerly attached, down to the
/// level cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTreeNode {
    pub id: ActivityId,
    pub name: String,
    pub parent_id: Option<ActivityId>,
    pub level: u8,
    pub children: Vec<ActivityTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneRecord {
    pub id: PhoneId,
    pub phone: String,
}

impl From<&OrganizationPhone> for PhoneRecord {
    fn from(p: &OrganizationPhone) -> Self {
        Self {
            id: p.id,
            phone: p.phone.clone(),
        }
    }
}

/// A search result: the organization with its building eagerly attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: OrganizationId,
    pub name: String,
    pub building: BuildingRecord,
}

/// The full organization card returned by single-record lookup: building,
/// phones, and the complete activity link list eagerly attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationCard {
    pub id: OrganizationId,
    pub name: String,
    pub building: BuildingRecord,
    pub phones: Vec<PhoneRecord>,
    pub activities: Vec<ActivityRecord>,
}

// ===== Configuration =====

/// Catalog configuration.
///
/// Designed to be loadable from JSON or TOML while keeping complexity
/// minimal.
///
/// # Example
///
/// ```rust
/// use orgdex::Config;
///
/// let config = Config::default();
/// assert!(config.enforce_tree_levels);
///
/// let json = r#"{ "distance_metric": "geodesic" }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Metric used for radius queries. Both options are geographic;
    /// coordinates are degrees over an ellipsoidal Earth, so a planar
    /// metric is not offered.
    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Enforce that a node's level equals its parent's level + 1 (roots are
    /// level 1 with no parent). Disable to reproduce the range-check-only
    /// behavior of legacy datasets.
    #[serde(default = "Config::default_enforce_tree_levels")]
    pub enforce_tree_levels: bool,
}

impl Config {
    const fn default_enforce_tree_levels() -> bool {
        true
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    pub fn with_enforce_tree_levels(mut self, enforce: bool) -> Self {
        self.enforce_tree_levels = enforce;
        self
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            distance_metric: DistanceMetric::default(),
            enforce_tree_levels: Self::default_enforce_tree_levels(),
        }
    }
}

/// Row counts across the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub building_count: usize,
    pub activity_count: usize,
    pub organization_count: usize,
    pub phone_count: usize,
    pub link_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_lat_lon_round_trip() {
        let b = Building::new(1, "1 Main St", 55.7558, 37.6173);
        assert!((b.lat() - 55.7558).abs() < f64::EPSILON);
        assert!((b.lon() - 37.6173).abs() < f64::EPSILON);
    }

    #[test]
    fn test_building_record_projection() {
        let b = Building::new(7, "7 Oak Ave", -33.8688, 151.2093);
        let rec = BuildingRecord::from(&b);
        assert_eq!(rec.id, 7);
        assert_eq!(rec.address, "7 Oak Ave");
        assert!((rec.lat - b.lat()).abs() < f64::EPSILON);
        assert!((rec.lon - b.lon()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.distance_metric, DistanceMetric::Haversine);
        assert!(config.enforce_tree_levels);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_distance_metric(DistanceMetric::Geodesic)
            .with_enforce_tree_levels(false);

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();

        assert_eq!(deserialized.distance_metric, DistanceMetric::Geodesic);
        assert!(!deserialized.enforce_tree_levels);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.distance_metric, DistanceMetric::Haversine);
        assert!(config.enforce_tree_levels);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default().with_distance_metric(DistanceMetric::Geodesic);
        let toml_str = config.to_toml().unwrap();
        let deserialized = Config::from_toml(&toml_str).unwrap();
        assert_eq!(deserialized.distance_metric, DistanceMetric::Geodesic);
    }
}
