//! The catalog facade.
//!
//! `Catalog` ties the relational store, the spatial index, and the
//! configuration together behind a clone-able handle. Reads take a shared
//! lock and run concurrently; the write API (seed loading, the mutation
//! methods) takes the exclusive lock and keeps the store and spatial index
//! in lockstep.

use crate::activity_tree;
use crate::builder::CatalogBuilder;
use crate::error::{CatalogError, Result};
use crate::query::{self, SearchFilter};
use crate::seed::Seed;
use crate::spatial;
use crate::spatial_index::BuildingIndex;
use crate::store::CatalogStore;
use crate::types::{
    Activity, ActivityId, ActivityTreeNode, Building, BuildingId, BuildingRecord, CatalogStats,
    Config, Organization, OrganizationCard, OrganizationId, OrganizationSummary, PhoneId,
};
use geo::Point;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Shared handle to an in-memory organization catalog.
///
/// Cloning is cheap; every clone reads and writes the same catalog. Each
/// request-serving worker holds its own clone and issues reads without
/// coordinating with the others.
///
/// # Examples
///
/// ```rust
/// use orgdex::{Catalog, SearchFilter};
///
/// let catalog = Catalog::new();
/// catalog.insert_building(1, "1 Main St", 55.7558, 37.6173)?;
/// catalog.insert_activity(1, "Food", None, 1)?;
/// catalog.insert_organization(1, "Corner Grocery", 1)?;
/// catalog.link_activity(1, 1)?;
///
/// let hits = catalog.search(&SearchFilter::new().with_name("grocery"))?;
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].building.address, "1 Main St");
/// # Ok::<(), orgdex::CatalogError>(())
/// ```
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogInner>>,
}

struct CatalogInner {
    store: CatalogStore,
    index: BuildingIndex,
    config: Config,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}

impl Catalog {
    /// Create an empty catalog with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty catalog with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CatalogInner {
                store: CatalogStore::new(),
                index: BuildingIndex::new(config.distance_metric),
                config,
            })),
        }
    }

    /// Builder with config and seed-source options.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// A copy of the active configuration.
    pub fn config(&self) -> Config {
        self.inner.read().config.clone()
    }

    // ===== Population =====

    /// Insert a building; its location is validated and spatially indexed.
    pub fn insert_building(
        &self,
        id: BuildingId,
        address: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Result<()> {
        let building = Building::new(id, address, lat, lon);
        let location = building.location;

        let mut inner = self.inner.write();
        inner.store.insert_building(building)?;
        inner.index.insert(id, &location);
        Ok(())
    }

    pub fn insert_activity(
        &self,
        id: ActivityId,
        name: impl Into<String>,
        parent_id: Option<ActivityId>,
        level: u8,
    ) -> Result<()> {
        let mut inner = self.inner.write();
        let enforce = inner.config.enforce_tree_levels;
        inner
            .store
            .insert_activity(Activity::new(id, name, parent_id, level), enforce)
    }

    pub fn insert_organization(
        &self,
        id: OrganizationId,
        name: impl Into<String>,
        building_id: BuildingId,
    ) -> Result<()> {
        self.inner
            .write()
            .store
            .insert_organization(Organization::new(id, name, building_id))
    }

    /// Attach a phone number to an organization; the id is allocated.
    pub fn add_phone(&self, org_id: OrganizationId, phone: impl Into<String>) -> Result<PhoneId> {
        self.inner.write().store.add_phone(org_id, phone)
    }

    /// Link an organization to an activity category.
    pub fn link_activity(&self, org_id: OrganizationId, activity_id: ActivityId) -> Result<()> {
        self.inner.write().store.link_activity(org_id, activity_id)
    }

    /// Delete an organization, cascading its phones and activity links.
    pub fn remove_organization(&self, id: OrganizationId) -> Result<()> {
        self.inner.write().store.remove_organization(id)
    }

    /// Delete a leaf activity, cascading its organization links.
    pub fn remove_activity(&self, id: ActivityId) -> Result<()> {
        self.inner.write().store.remove_activity(id)
    }

    /// Delete an unoccupied building, evicting it from the spatial index.
    pub fn remove_building(&self, id: BuildingId) -> Result<()> {
        let mut inner = self.inner.write();
        inner.store.remove_building(id)?;
        inner.index.remove(id);
        Ok(())
    }

    /// Apply a seed document. Any malformed row aborts the load with the
    /// violated constraint; a partially applied seed should be discarded
    /// with the catalog.
    pub fn load_seed(&self, seed: &Seed) -> Result<()> {
        let mut inner = self.inner.write();
        let enforce = inner.config.enforce_tree_levels;

        for b in &seed.buildings {
            let building = Building::new(b.id, b.address.clone(), b.lat, b.lon);
            let location = building.location;
            inner.store.insert_building(building)?;
            inner.index.insert(b.id, &location);
        }

        // Children may be listed before their parents; level order makes
        // the load insensitive to document order.
        let mut activities: Vec<_> = seed.activities.iter().collect();
        activities.sort_by_key(|a| (a.level, a.id));
        for a in activities {
            inner.store.insert_activity(
                Activity::new(a.id, a.name.clone(), a.parent_id, a.level),
                enforce,
            )?;
        }

        for o in &seed.organizations {
            inner
                .store
                .insert_organization(Organization::new(o.id, o.name.clone(), o.building_id))?;
        }
        for o in &seed.organizations {
            for phone in &o.phones {
                inner.store.add_phone(o.id, phone.clone())?;
            }
            for &activity_id in &o.activity_ids {
                inner.store.link_activity(o.id, activity_id)?;
            }
        }

        let stats = inner.store.stats();
        log::info!(
            "seed loaded: {} buildings, {} activities, {} organizations, {} phones, {} links",
            stats.building_count,
            stats.activity_count,
            stats.organization_count,
            stats.phone_count,
            stats.link_count
        );
        Ok(())
    }

    /// Parse and apply a JSON seed document.
    pub fn load_seed_json(&self, json: &str) -> Result<()> {
        self.load_seed(&Seed::from_json(json)?)
    }

    /// Read, parse, and apply a seed file.
    pub fn load_seed_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.load_seed(&Seed::from_path(path)?)
    }

    // ===== Reads =====

    /// Full organization card with building, phones, and activities eagerly
    /// attached.
    ///
    /// ```rust
    /// use orgdex::{Catalog, CatalogError};
    ///
    /// let catalog = Catalog::new();
    /// let err = catalog.organization(999).unwrap_err();
    /// assert!(matches!(err, CatalogError::NotFound(_)));
    /// ```
    pub fn organization(&self, id: OrganizationId) -> Result<OrganizationCard> {
        let inner = self.inner.read();
        let organization = inner
            .store
            .organization(id)
            .ok_or_else(|| CatalogError::not_found("organization", id))?;
        inner.store.card(organization)
    }

    /// Search organizations by the AND-combined filter options. Results are
    /// deduplicated by id and carry the eager building record.
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<OrganizationSummary>> {
        query::search(&self.inner.read().store, filter)
    }

    /// Organizations whose building lies within `radius_meters` of the
    /// center, nearest building first.
    pub fn organizations_within_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_meters: f64,
    ) -> Result<Vec<OrganizationSummary>> {
        let inner = self.inner.read();
        let center = Point::new(lon, lat);
        let building_ids = inner.index.within_radius(&center, radius_meters)?;
        inner.collect_in_buildings(&building_ids)
    }

    /// Organizations whose building falls inside the box (boundary
    /// inclusive).
    pub fn organizations_within_bbox(
        &self,
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    ) -> Result<Vec<OrganizationSummary>> {
        let bbox = spatial::bounding_box(min_lat, min_lon, max_lat, max_lon)?;
        let inner = self.inner.read();
        let building_ids = inner.index.within_bbox(&bbox);
        inner.collect_in_buildings(&building_ids)
    }

    /// Activity listing with eager subtrees; see
    /// [`activity_tree::activity_tree`] for level-filter semantics.
    pub fn activities(&self, level: Option<u8>) -> Result<Vec<ActivityTreeNode>> {
        activity_tree::activity_tree(&self.inner.read().store, level)
    }

    /// Descendant closure of an activity, including the activity itself.
    pub fn activity_descendants(&self, id: ActivityId) -> Result<Vec<ActivityId>> {
        Ok(activity_tree::descendants(&self.inner.read().store, id))
    }

    /// All buildings with derived lat/lon, id-ordered.
    pub fn buildings(&self) -> Vec<BuildingRecord> {
        let inner = self.inner.read();
        let mut records: Vec<BuildingRecord> =
            inner.store.iter_buildings().map(BuildingRecord::from).collect();
        records.sort_by_key(|b| b.id);
        records
    }

    pub fn stats(&self) -> CatalogStats {
        self.inner.read().store.stats()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogInner {
    /// Eagerly attach organizations for a building id list, preserving the
    /// building order and id-ordering organizations within each building.
    fn collect_in_buildings(
        &self,
        building_ids: &[BuildingId],
    ) -> Result<Vec<OrganizationSummary>> {
        let mut results = Vec::new();
        for &building_id in building_ids {
            let mut org_ids = self.store.organizations_in(building_id).to_vec();
            org_ids.sort_unstable();
            for org_id in org_ids {
                if let Some(organization) = self.store.organization(org_id) {
                    results.push(self.store.summary(organization)?);
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_catalog() -> Catalog {
        let catalog = Catalog::new();
        catalog
            .load_seed_json(
                r#"{
                    "buildings": [
                        { "id": 1, "address": "1 Main St", "lat": 55.0, "lon": 37.0 },
                        { "id": 2, "address": "9 Far Rd", "lat": 55.09, "lon": 37.0 }
                    ],
                    "activities": [
                        { "id": 2, "name": "Meat", "parent_id": 1, "level": 2 },
                        { "id": 1, "name": "Food", "level": 1 },
                        { "id": 3, "name": "Dairy", "parent_id": 1, "level": 2 }
                    ],
                    "organizations": [
                        {
                            "id": 1, "name": "Meaty Bits", "building_id": 1,
                            "phones": ["2-222-222"], "activity_ids": [2]
                        },
                        {
                            "id": 2, "name": "Corner Dairy", "building_id": 2,
                            "phones": ["3-333-333", "4-444-444"], "activity_ids": [3]
                        }
                    ]
                }"#,
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_seed_load_is_order_insensitive_for_activities() {
        // "Meat" precedes its parent "Food" in the document above.
        let catalog = seeded_catalog();
        assert_eq!(catalog.stats().activity_count, 3);
    }

    #[test]
    fn test_get_organization_card() {
        let catalog = seeded_catalog();
        let card = catalog.organization(2).unwrap();
        assert_eq!(card.name, "Corner Dairy");
        assert_eq!(card.building.address, "9 Far Rd");
        assert_eq!(card.phones.len(), 2);
        assert_eq!(card.activities.len(), 1);
        assert_eq!(card.activities[0].name, "Dairy");
    }

    #[test]
    fn test_get_missing_organization_is_not_found() {
        let catalog = seeded_catalog();
        assert!(matches!(
            catalog.organization(999).unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }

    #[test]
    fn test_recursive_search_example() {
        let catalog = seeded_catalog();

        let recursive = catalog
            .search(&SearchFilter::new().with_activity(1).recursive(true))
            .unwrap();
        let ids: Vec<_> = recursive.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let direct = catalog
            .search(&SearchFilter::new().with_activity(1))
            .unwrap();
        assert!(direct.is_empty());
    }

    #[test]
    fn test_radius_search() {
        let catalog = seeded_catalog();

        let near = catalog.organizations_within_radius(55.0, 37.0, 10.0).unwrap();
        let ids: Vec<_> = near.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1]);

        // ~10 km separates the two buildings.
        let wide = catalog
            .organizations_within_radius(55.0, 37.0, 15_000.0)
            .unwrap();
        assert_eq!(wide.len(), 2);
        // Nearest building first.
        assert_eq!(wide[0].id, 1);

        let elsewhere = catalog
            .organizations_within_radius(54.9, 37.0, 10.0)
            .unwrap();
        assert!(elsewhere.is_empty());
    }

    #[test]
    fn test_bbox_search_boundary_inclusive() {
        let catalog = seeded_catalog();

        let hits = catalog
            .organizations_within_bbox(55.0, 37.0, 55.0, 37.0)
            .unwrap();
        let ids: Vec<_> = hits.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1]);

        let hits = catalog
            .organizations_within_bbox(54.5, 36.5, 55.5, 37.5)
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_geo_input_rejection() {
        let catalog = seeded_catalog();

        assert!(matches!(
            catalog
                .organizations_within_radius(95.0, 37.0, 100.0)
                .unwrap_err(),
            CatalogError::InvalidInput(_)
        ));
        assert!(matches!(
            catalog
                .organizations_within_radius(55.0, 37.0, -1.0)
                .unwrap_err(),
            CatalogError::InvalidInput(_)
        ));
        assert!(matches!(
            catalog
                .organizations_within_bbox(55.0, 37.0, 54.0, 38.0)
                .unwrap_err(),
            CatalogError::InvalidInput(_)
        ));
        assert!(matches!(
            catalog
                .organizations_within_bbox(0.0, -200.0, 1.0, 1.0)
                .unwrap_err(),
            CatalogError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_buildings_listing() {
        let catalog = seeded_catalog();
        let buildings = catalog.buildings();
        assert_eq!(buildings.len(), 2);
        assert_eq!(buildings[0].id, 1);
        assert!((buildings[1].lat - 55.09).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remove_building_updates_spatial_index() {
        let catalog = seeded_catalog();
        catalog.remove_organization(1).unwrap();
        catalog.remove_building(1).unwrap();

        let hits = catalog
            .organizations_within_bbox(54.5, 36.5, 55.5, 37.5)
            .unwrap();
        let ids: Vec<_> = hits.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_concurrent_reads_through_clones() {
        let catalog = seeded_catalog();
        let mut handles = Vec::new();

        for _ in 0..4 {
            let reader = catalog.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    let hits = reader
                        .search(&SearchFilter::new().with_activity(1).recursive(true))
                        .unwrap();
                    assert_eq!(hits.len(), 2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
