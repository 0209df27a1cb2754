//! Embedded, read-oriented catalog of organizations, buildings, and a
//! 3-level taxonomy of business activities, with geospatial search.
//!
//! ```rust
//! use orgdex::{Catalog, SearchFilter};
//!
//! let catalog = Catalog::new();
//! catalog.insert_building(1, "1 Main St", 55.7558, 37.6173)?;
//! catalog.insert_activity(1, "Food", None, 1)?;
//! catalog.insert_activity(2, "Meat", Some(1), 2)?;
//! catalog.insert_organization(1, "Meaty Bits", 1)?;
//! catalog.link_activity(1, 2)?;
//!
//! // Category search expands the activity subtree when asked to.
//! let hits = catalog.search(&SearchFilter::new().with_activity(1).recursive(true))?;
//! assert_eq!(hits.len(), 1);
//!
//! // Proximity search is geodesic over building locations.
//! let nearby = catalog.organizations_within_radius(55.7558, 37.6173, 100.0)?;
//! assert_eq!(nearby.len(), 1);
//! # Ok::<(), orgdex::CatalogError>(())
//! ```

pub mod activity_tree;
pub mod auth;
pub mod builder;
pub mod catalog;
pub mod error;
pub mod query;
pub mod seed;
pub mod spatial;
pub mod spatial_index;
pub mod store;
pub mod types;

pub use builder::CatalogBuilder;
pub use catalog::Catalog;
pub use error::{CatalogError, Result};

pub use geo::{Point, Rect};

pub use auth::{Authenticator, NoAuth, StaticKeyAuth};
pub use query::SearchFilter;
pub use seed::{Seed, SeedActivity, SeedBuilding, SeedOrganization};
pub use spatial::DistanceMetric;
pub use spatial_index::BuildingIndex;
pub use store::CatalogStore;

pub use types::{
    Activity, ActivityId, ActivityRecord, ActivityTreeNode, Building, BuildingId, BuildingRecord,
    CatalogStats, Config, MAX_ACTIVITY_LEVEL, Organization, OrganizationCard, OrganizationId,
    OrganizationPhone, OrganizationSummary, PhoneId, PhoneRecord,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Catalog, CatalogBuilder, CatalogError, Result};

    pub use geo::{Point, Rect};

    pub use crate::{DistanceMetric, SearchFilter};

    pub use crate::{CatalogStats, Config};

    pub use crate::{Seed, SeedActivity, SeedBuilding, SeedOrganization};

    pub use crate::{Authenticator, NoAuth, StaticKeyAuth};
}
