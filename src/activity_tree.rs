//! Activity taxonomy traversal.
//!
//! The storage engine has no recursive query support, so both operations
//! walk the derived parent→child index in application code: an iterative
//! breadth-first fixpoint for the descendant closure, and a depth-budgeted
//! recursive assembly for the eager tree listing.

use crate::error::{CatalogError, Result};
use crate::store::CatalogStore;
use crate::types::{Activity, ActivityId, ActivityTreeNode, MAX_ACTIVITY_LEVEL};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Transitive closure of descendants reachable from `root`, including
/// `root` itself, in ascending id order.
///
/// The closure of an id with no children is the id alone; the closure of an
/// id absent from the store is empty (an anchor row that does not exist
/// matches nothing). A visited set guarantees termination even if the
/// parent links were loaded malformed.
///
/// ```rust
/// use orgdex::Catalog;
///
/// let catalog = Catalog::new();
/// catalog.insert_activity(1, "Food", None, 1)?;
/// catalog.insert_activity(2, "Meat", Some(1), 2)?;
///
/// assert_eq!(catalog.activity_descendants(1)?, vec![1, 2]);
/// assert_eq!(catalog.activity_descendants(2)?, vec![2]);
/// # Ok::<(), orgdex::CatalogError>(())
/// ```
pub fn descendants(store: &CatalogStore, root: ActivityId) -> Vec<ActivityId> {
    if store.activity(root).is_none() {
        return Vec::new();
    }

    let mut closure: FxHashSet<ActivityId> = FxHashSet::default();
    let mut frontier: VecDeque<ActivityId> = VecDeque::new();
    closure.insert(root);
    frontier.push_back(root);

    while let Some(id) = frontier.pop_front() {
        for &child in store.children_of(id) {
            if closure.insert(child) {
                frontier.push_back(child);
            }
        }
    }

    let mut ids: Vec<ActivityId> = closure.into_iter().collect();
    ids.sort_unstable();
    ids
}

/// Eager tree listing: every activity (or exactly those at `level`) as a
/// root of the result, with its subtree of children attached down to the
/// level cap.
///
/// A `level` outside [1, 3] is rejected with `InvalidInput`.
pub fn activity_tree(
    store: &CatalogStore,
    level: Option<u8>,
) -> Result<Vec<ActivityTreeNode>> {
    if let Some(l) = level
        && !(1..=MAX_ACTIVITY_LEVEL).contains(&l)
    {
        return Err(CatalogError::InvalidInput(format!(
            "level filter out of range [1, {}]: {}",
            MAX_ACTIVITY_LEVEL, l
        )));
    }

    let mut roots: Vec<&Activity> = store
        .iter_activities()
        .filter(|a| level.is_none_or(|l| a.level == l))
        .collect();
    roots.sort_by_key(|a| a.id);

    Ok(roots
        .into_iter()
        .map(|a| build_node(store, a, MAX_ACTIVITY_LEVEL))
        .collect())
}

fn build_node(store: &CatalogStore, activity: &Activity, depth_budget: u8) -> ActivityTreeNode {
    let children = if depth_budget == 0 {
        Vec::new()
    } else {
        let mut child_ids = store.children_of(activity.id).to_vec();
        child_ids.sort_unstable();
        child_ids
            .into_iter()
            .filter_map(|id| store.activity(id))
            .map(|child| build_node(store, child, depth_budget - 1))
            .collect()
    };

    ActivityTreeNode {
        id: activity.id,
        name: activity.name.clone(),
        parent_id: activity.parent_id,
        level: activity.level,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Food (1) -> Meat (2), Dairy (3); Meat -> Sausages (4); Vehicles (5).
    fn taxonomy() -> CatalogStore {
        let mut store = CatalogStore::new();
        store
            .insert_activity(Activity::new(1, "Food", None, 1), true)
            .unwrap();
        store
            .insert_activity(Activity::new(2, "Meat", Some(1), 2), true)
            .unwrap();
        store
            .insert_activity(Activity::new(3, "Dairy", Some(1), 2), true)
            .unwrap();
        store
            .insert_activity(Activity::new(4, "Sausages", Some(2), 3), true)
            .unwrap();
        store
            .insert_activity(Activity::new(5, "Vehicles", None, 1), true)
            .unwrap();
        store
    }

    #[test]
    fn test_closure_includes_start_and_descendants() {
        let store = taxonomy();
        assert_eq!(descendants(&store, 1), vec![1, 2, 3, 4]);
        assert_eq!(descendants(&store, 2), vec![2, 4]);
    }

    #[test]
    fn test_closure_of_leaf_is_itself() {
        let store = taxonomy();
        assert_eq!(descendants(&store, 4), vec![4]);
        assert_eq!(descendants(&store, 3), vec![3]);
    }

    #[test]
    fn test_closure_of_missing_id_is_empty() {
        let store = taxonomy();
        assert!(descendants(&store, 42).is_empty());
    }

    #[test]
    fn test_closure_is_idempotent() {
        let store = taxonomy();
        let first = descendants(&store, 1);
        let second = descendants(&store, 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tree_without_filter_lists_every_node() {
        let store = taxonomy();
        let tree = activity_tree(&store, None).unwrap();

        // All five nodes appear as roots, each with its own subtree.
        assert_eq!(tree.len(), 5);
        let food = &tree[0];
        assert_eq!(food.id, 1);
        assert_eq!(food.children.len(), 2);
        assert_eq!(food.children[0].id, 2);
        assert_eq!(food.children[0].children[0].id, 4);
        assert_eq!(food.children[1].id, 3);
    }

    #[test]
    fn test_tree_level_filter() {
        let store = taxonomy();

        let level1 = activity_tree(&store, Some(1)).unwrap();
        let ids: Vec<_> = level1.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 5]);

        let level2 = activity_tree(&store, Some(2)).unwrap();
        let ids: Vec<_> = level2.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3]);
        // Level-2 roots still carry their own children.
        assert_eq!(level2[0].children[0].id, 4);

        let level3 = activity_tree(&store, Some(3)).unwrap();
        assert_eq!(level3.len(), 1);
        assert!(level3[0].children.is_empty());
    }

    #[test]
    fn test_tree_rejects_out_of_range_level() {
        let store = taxonomy();
        assert!(matches!(
            activity_tree(&store, Some(0)).unwrap_err(),
            CatalogError::InvalidInput(_)
        ));
        assert!(matches!(
            activity_tree(&store, Some(4)).unwrap_err(),
            CatalogError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_tree_of_empty_store() {
        let store = CatalogStore::new();
        assert!(activity_tree(&store, None).unwrap().is_empty());
    }
}
