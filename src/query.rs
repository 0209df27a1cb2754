//! Organization search: filter composition and execution.
//!
//! Filters AND-compose into one pass over a candidate set narrowed by the
//! most selective derived index available (activity links, then building
//! occupancy, then a full scan). The activity join can reach the same
//! organization through several links, so candidates are deduplicated by id
//! before predicates run.

use crate::activity_tree;
use crate::error::Result;
use crate::store::CatalogStore;
use crate::types::{ActivityId, BuildingId, OrganizationId, OrganizationSummary};
use rustc_hash::FxHashSet;

/// Recognized search options. All present filters must hold.
///
/// # Examples
///
/// ```rust
/// use orgdex::SearchFilter;
///
/// let filter = SearchFilter::new()
///     .with_name("dairy")
///     .with_activity(1)
///     .recursive(true);
/// assert_eq!(filter.activity_id, Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Case-insensitive substring match against the organization name.
    pub name: Option<String>,
    /// Exact match against the organization's building.
    pub building_id: Option<BuildingId>,
    /// Activity link filter; see [`SearchFilter::recursive`].
    pub activity_id: Option<ActivityId>,
    /// With `activity_id`: match any activity in the descendant closure
    /// instead of the direct link only.
    pub recursive: bool,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_building(mut self, building_id: BuildingId) -> Self {
        self.building_id = Some(building_id);
        self
    }

    pub fn with_activity(mut self, activity_id: ActivityId) -> Self {
        self.activity_id = Some(activity_id);
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// True when no filter is set; the search degenerates to a full listing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.building_id.is_none() && self.activity_id.is_none()
    }
}

/// Execute a search. Results are id-ordered, deduplicated, and carry the
/// eager building record.
pub(crate) fn search(
    store: &CatalogStore,
    filter: &SearchFilter,
) -> Result<Vec<OrganizationSummary>> {
    let mut candidates: Vec<OrganizationId> = match filter.activity_id {
        Some(activity_id) => {
            let activity_ids: Vec<ActivityId> = if filter.recursive {
                activity_tree::descendants(store, activity_id)
            } else {
                vec![activity_id]
            };

            // One organization may match through several links; keep it once.
            let mut seen: FxHashSet<OrganizationId> = FxHashSet::default();
            let mut ids = Vec::new();
            for aid in &activity_ids {
                for &org_id in store.organizations_linked_to(*aid) {
                    if seen.insert(org_id) {
                        ids.push(org_id);
                    }
                }
            }
            ids
        }
        None => match filter.building_id {
            Some(building_id) => store.organizations_in(building_id).to_vec(),
            None => store.iter_organizations().map(|o| o.id).collect(),
        },
    };
    candidates.sort_unstable();

    let name_needle = filter.name.as_deref().map(str::to_lowercase);

    let mut results = Vec::with_capacity(candidates.len());
    for id in candidates {
        let Some(organization) = store.organization(id) else {
            continue;
        };

        if let Some(building_id) = filter.building_id
            && organization.building_id != building_id
        {
            continue;
        }

        if let Some(needle) = &name_needle
            && !organization.name.to_lowercase().contains(needle.as_str())
        {
            continue;
        }

        results.push(store.summary(organization)?);
    }

    Ok(results)
}
