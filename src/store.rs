//! In-memory relational store for the catalog.
//!
//! Rows live in arenas keyed by surrogate id; every relationship is a
//! derived index recomputed from the owning column (parent_id, building_id,
//! org_id), never separately persisted. Insertion validates the schema
//! constraints a relational engine would enforce at write time; deletes
//! cascade or restrict the way the schema declares.
//!
//! Eager-load plans are explicit: [`CatalogStore::summary`] and
//! [`CatalogStore::card`] assemble read models in a fixed number of arena
//! lookups, so no query path ever triggers per-row follow-up fetches.

use crate::error::{CatalogError, Result};
use crate::spatial;
use crate::types::{
    Activity, ActivityId, ActivityRecord, Building, BuildingId, BuildingRecord, CatalogStats,
    MAX_ACTIVITY_LEVEL, Organization, OrganizationCard, OrganizationId, OrganizationPhone,
    OrganizationSummary, PhoneId, PhoneRecord,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Default)]
pub struct CatalogStore {
    buildings: FxHashMap<BuildingId, Building>,
    activities: FxHashMap<ActivityId, Activity>,
    organizations: FxHashMap<OrganizationId, Organization>,
    phones: FxHashMap<PhoneId, OrganizationPhone>,

    // Derived back-references.
    children: FxHashMap<ActivityId, SmallVec<[ActivityId; 4]>>,
    orgs_by_building: FxHashMap<BuildingId, SmallVec<[OrganizationId; 4]>>,
    phones_by_org: FxHashMap<OrganizationId, SmallVec<[PhoneId; 2]>>,

    // The organization<->activity association, indexed from both ends.
    activities_by_org: FxHashMap<OrganizationId, SmallVec<[ActivityId; 4]>>,
    orgs_by_activity: FxHashMap<ActivityId, SmallVec<[OrganizationId; 4]>>,

    next_phone_id: PhoneId,
    link_count: usize,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            next_phone_id: 1,
            ..Self::default()
        }
    }

    // ===== Inserts =====

    /// Insert a building row. Rejects duplicate ids and out-of-range
    /// coordinates.
    pub fn insert_building(&mut self, building: Building) -> Result<()> {
        spatial::validate_geographic_point(&building.location)?;

        if self.buildings.contains_key(&building.id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "duplicate building id {}",
                building.id
            )));
        }

        self.buildings.insert(building.id, building);
        Ok(())
    }

    /// Insert an activity row.
    ///
    /// Always enforced: unique id, level in [1, 3], existing parent.
    /// With `enforce_levels`, additionally: roots are level 1 with no
    /// parent, children sit exactly one level below their parent. Disabling
    /// it reproduces the range-check-only behavior of legacy datasets.
    pub fn insert_activity(&mut self, activity: Activity, enforce_levels: bool) -> Result<()> {
        if self.activities.contains_key(&activity.id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "duplicate activity id {}",
                activity.id
            )));
        }

        if activity.level < 1 || activity.level > MAX_ACTIVITY_LEVEL {
            return Err(CatalogError::ConstraintViolation(format!(
                "activity {} level {} out of range [1, {}]",
                activity.id, activity.level, MAX_ACTIVITY_LEVEL
            )));
        }

        match activity.parent_id {
            Some(parent_id) => {
                let parent = self.activities.get(&parent_id).ok_or_else(|| {
                    CatalogError::ConstraintViolation(format!(
                        "activity {} references missing parent {}",
                        activity.id, parent_id
                    ))
                })?;

                if enforce_levels && activity.level != parent.level + 1 {
                    return Err(CatalogError::ConstraintViolation(format!(
                        "activity {} at level {} under parent {} at level {}",
                        activity.id, activity.level, parent_id, parent.level
                    )));
                }
            }
            None => {
                if enforce_levels && activity.level != 1 {
                    return Err(CatalogError::ConstraintViolation(format!(
                        "root activity {} must be level 1, got {}",
                        activity.id, activity.level
                    )));
                }
            }
        }

        if let Some(parent_id) = activity.parent_id {
            self.children.entry(parent_id).or_default().push(activity.id);
        }
        self.activities.insert(activity.id, activity);
        Ok(())
    }

    /// Insert an organization row. The building foreign key must resolve.
    pub fn insert_organization(&mut self, organization: Organization) -> Result<()> {
        if self.organizations.contains_key(&organization.id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "duplicate organization id {}",
                organization.id
            )));
        }

        if !self.buildings.contains_key(&organization.building_id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "organization {} references missing building {}",
                organization.id, organization.building_id
            )));
        }

        self.orgs_by_building
            .entry(organization.building_id)
            .or_default()
            .push(organization.id);
        self.organizations.insert(organization.id, organization);
        Ok(())
    }

    /// Insert a phone row with an explicit id.
    pub fn insert_phone(&mut self, phone: OrganizationPhone) -> Result<()> {
        if self.phones.contains_key(&phone.id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "duplicate phone id {}",
                phone.id
            )));
        }

        if !self.organizations.contains_key(&phone.org_id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "phone {} references missing organization {}",
                phone.id, phone.org_id
            )));
        }

        self.next_phone_id = self.next_phone_id.max(phone.id + 1);
        self.phones_by_org
            .entry(phone.org_id)
            .or_default()
            .push(phone.id);
        self.phones.insert(phone.id, phone);
        Ok(())
    }

    /// Insert a phone row, allocating the next free id.
    pub fn add_phone(&mut self, org_id: OrganizationId, phone: impl Into<String>) -> Result<PhoneId> {
        let id = self.next_phone_id;
        self.insert_phone(OrganizationPhone {
            id,
            org_id,
            phone: phone.into(),
        })?;
        Ok(id)
    }

    /// Link an organization to an activity. The pair is a composite key:
    /// linking twice is rejected.
    pub fn link_activity(
        &mut self,
        org_id: OrganizationId,
        activity_id: ActivityId,
    ) -> Result<()> {
        if !self.organizations.contains_key(&org_id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "link references missing organization {}",
                org_id
            )));
        }
        if !self.activities.contains_key(&activity_id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "link references missing activity {}",
                activity_id
            )));
        }

        let links = self.activities_by_org.entry(org_id).or_default();
        if links.contains(&activity_id) {
            return Err(CatalogError::ConstraintViolation(format!(
                "duplicate link ({}, {})",
                org_id, activity_id
            )));
        }

        links.push(activity_id);
        self.orgs_by_activity
            .entry(activity_id)
            .or_default()
            .push(org_id);
        self.link_count += 1;
        Ok(())
    }

    // ===== Deletes =====

    /// Delete an organization, cascading its phones and association links.
    /// The building and activity rows are unaffected.
    pub fn remove_organization(&mut self, id: OrganizationId) -> Result<()> {
        let organization = self
            .organizations
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found("organization", id))?;

        let phone_ids = self.phones_by_org.remove(&id).unwrap_or_default();
        for phone_id in &phone_ids {
            self.phones.remove(phone_id);
        }

        let linked = self.activities_by_org.remove(&id).unwrap_or_default();
        for activity_id in &linked {
            if let Some(orgs) = self.orgs_by_activity.get_mut(activity_id) {
                orgs.retain(|o| *o != id);
            }
        }
        self.link_count -= linked.len();

        if let Some(orgs) = self.orgs_by_building.get_mut(&organization.building_id) {
            orgs.retain(|o| *o != id);
        }

        log::debug!(
            "removed organization {} (cascaded {} phones, {} links)",
            id,
            phone_ids.len(),
            linked.len()
        );
        Ok(())
    }

    /// Delete an activity, cascading its association links. Rejected while
    /// the activity still has children (the parent reference carries no
    /// cascade).
    pub fn remove_activity(&mut self, id: ActivityId) -> Result<()> {
        if !self.activities.contains_key(&id) {
            return Err(CatalogError::not_found("activity", id));
        }

        if !self.children_of(id).is_empty() {
            return Err(CatalogError::ConstraintViolation(format!(
                "activity {} still has children",
                id
            )));
        }

        let activity = self
            .activities
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found("activity", id))?;

        let linked = self.orgs_by_activity.remove(&id).unwrap_or_default();
        for org_id in &linked {
            if let Some(links) = self.activities_by_org.get_mut(org_id) {
                links.retain(|a| *a != id);
            }
        }
        self.link_count -= linked.len();

        if let Some(parent_id) = activity.parent_id
            && let Some(siblings) = self.children.get_mut(&parent_id)
        {
            siblings.retain(|c| *c != id);
        }
        self.children.remove(&id);
        Ok(())
    }

    /// Delete a building. Rejected while organizations still reference it.
    /// Returns the removed row so the caller can evict the spatial index.
    pub fn remove_building(&mut self, id: BuildingId) -> Result<Building> {
        if !self.buildings.contains_key(&id) {
            return Err(CatalogError::not_found("building", id));
        }

        if !self.organizations_in(id).is_empty() {
            return Err(CatalogError::ConstraintViolation(format!(
                "building {} still has organizations",
                id
            )));
        }

        self.orgs_by_building.remove(&id);
        self.buildings
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found("building", id))
    }

    // ===== Point lookups and scans =====

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn activity(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.get(&id)
    }

    pub fn organization(&self, id: OrganizationId) -> Option<&Organization> {
        self.organizations.get(&id)
    }

    /// Derived child list of an activity.
    pub fn children_of(&self, id: ActivityId) -> &[ActivityId] {
        self.children.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Organizations occupying a building.
    pub fn organizations_in(&self, building_id: BuildingId) -> &[OrganizationId] {
        self.orgs_by_building
            .get(&building_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Organizations directly linked to an activity.
    pub fn organizations_linked_to(&self, activity_id: ActivityId) -> &[OrganizationId] {
        self.orgs_by_activity
            .get(&activity_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Activities an organization is directly linked to.
    pub fn activity_ids_of(&self, org_id: OrganizationId) -> &[ActivityId] {
        self.activities_by_org
            .get(&org_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter_buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn iter_activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    pub fn iter_organizations(&self) -> impl Iterator<Item = &Organization> {
        self.organizations.values()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            building_count: self.buildings.len(),
            activity_count: self.activities.len(),
            organization_count: self.organizations.len(),
            phone_count: self.phones.len(),
            link_count: self.link_count,
        }
    }

    // ===== Eager-load plans =====

    /// Organization with its building attached.
    pub fn summary(&self, organization: &Organization) -> Result<OrganizationSummary> {
        let building = self.buildings.get(&organization.building_id).ok_or_else(|| {
            CatalogError::Other(format!(
                "building row {} missing for organization {}",
                organization.building_id, organization.id
            ))
        })?;

        Ok(OrganizationSummary {
            id: organization.id,
            name: organization.name.clone(),
            building: BuildingRecord::from(building),
        })
    }

    /// Full card: building, phones, and activity links attached, id-ordered.
    pub fn card(&self, organization: &Organization) -> Result<OrganizationCard> {
        let summary = self.summary(organization)?;

        let mut phone_ids: Vec<PhoneId> = self
            .phones_by_org
            .get(&organization.id)
            .map(|v| v.to_vec())
            .unwrap_or_default();
        phone_ids.sort_unstable();
        let phones: Vec<PhoneRecord> = phone_ids
            .iter()
            .filter_map(|id| self.phones.get(id))
            .map(PhoneRecord::from)
            .collect();

        let mut activity_ids: Vec<ActivityId> = self.activity_ids_of(organization.id).to_vec();
        activity_ids.sort_unstable();
        let activities: Vec<ActivityRecord> = activity_ids
            .iter()
            .filter_map(|id| self.activities.get(id))
            .map(ActivityRecord::from)
            .collect();

        Ok(OrganizationCard {
            id: summary.id,
            name: summary.name,
            building: summary.building,
            phones,
            activities,
        })
    }
}
