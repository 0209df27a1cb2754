//! R-tree index over building locations.
//!
//! The index answers the two geospatial predicates of the catalog:
//! distance-within-radius and bounding-box containment. Radius queries run
//! an envelope prefilter through the R-tree (cheap) followed by an exact
//! geodesic distance check (expensive); box queries are pure envelope
//! lookups, boundary inclusive.

use crate::error::Result;
use crate::spatial::{self, DistanceMetric};
use crate::types::BuildingId;
use geo::{Point, Rect};
use rstar::{AABB, Point as RstarPoint, RTree};

/// Safety margin on the degree-space envelope so the spherical-approximation
/// prefilter never excludes a point the exact metric would accept.
const PAD_SAFETY: f64 = 1.02;

/// Meters per degree of latitude at its shortest (the equatorial meridian).
const MIN_METERS_PER_DEGREE_LAT: f64 = 110_574.0;

/// Meters per degree of longitude at the equator.
const METERS_PER_DEGREE_LON_EQUATOR: f64 = 111_320.0;

/// A building location wrapper for use with the R-tree.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedBuilding {
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
    pub id: BuildingId,
}

impl IndexedBuilding {
    fn anchor(x: f64, y: f64) -> Self {
        Self { x, y, id: 0 }
    }
}

impl RstarPoint for IndexedBuilding {
    type Scalar = f64;
    const DIMENSIONS: usize = 2;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self {
            x: generator(0),
            y: generator(1),
            id: 0,
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.x,
            1 => self.y,
            _ => unreachable!(),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => unreachable!(),
        }
    }
}

/// Spatial index over the building store.
pub struct BuildingIndex {
    tree: RTree<IndexedBuilding>,
    metric: DistanceMetric,
}

impl BuildingIndex {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            tree: RTree::new(),
            metric,
        }
    }

    /// Insert a building location. The caller is responsible for coordinate
    /// validation and id uniqueness (the store enforces both).
    pub fn insert(&mut self, id: BuildingId, location: &Point) {
        self.tree.insert(IndexedBuilding {
            x: location.x(),
            y: location.y(),
            id,
        });
    }

    /// Remove a building from the index. Returns whether anything was
    /// removed.
    pub fn remove(&mut self, id: BuildingId) -> bool {
        let stale: Vec<_> = self
            .tree
            .iter()
            .filter(|b| b.id == id)
            .cloned()
            .collect();

        let mut removed = false;
        for entry in stale {
            removed |= self.tree.remove(&entry).is_some();
        }
        removed
    }

    /// Buildings whose geodesic distance to `center` is within
    /// `radius_meters`, nearest first.
    ///
    /// Rejects out-of-range centers and non-positive radii with
    /// `InvalidInput`.
    pub fn within_radius(&self, center: &Point, radius_meters: f64) -> Result<Vec<BuildingId>> {
        spatial::validate_geographic_point(center)?;
        spatial::validate_radius(radius_meters)?;

        let mut hits: Vec<(BuildingId, f64)> = Vec::new();
        for envelope in radius_envelopes(center, radius_meters) {
            for entry in self.tree.locate_in_envelope(&envelope) {
                let candidate = Point::new(entry.x, entry.y);
                let distance = spatial::distance_between(center, &candidate, self.metric);
                if distance <= radius_meters {
                    hits.push((entry.id, distance));
                }
            }
        }

        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        Ok(hits.into_iter().map(|(id, _)| id).collect())
    }

    /// Buildings whose point falls inside the box, boundary inclusive.
    /// A degenerate box (min == max) matches a building at exactly those
    /// coordinates.
    pub fn within_bbox(&self, bbox: &Rect) -> Vec<BuildingId> {
        let envelope = AABB::from_corners(
            IndexedBuilding::anchor(bbox.min().x, bbox.min().y),
            IndexedBuilding::anchor(bbox.max().x, bbox.max().y),
        );

        let mut ids: Vec<BuildingId> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|entry| entry.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Degree-space envelopes covering the radius circle. Usually one box; two
/// disjoint boxes when the circle crosses the antimeridian.
fn radius_envelopes(center: &Point, radius_meters: f64) -> Vec<AABB<IndexedBuilding>> {
    let lat_pad = (radius_meters / MIN_METERS_PER_DEGREE_LAT) * PAD_SAFETY;
    let min_lat = (center.y() - lat_pad).max(-90.0);
    let max_lat = (center.y() + lat_pad).min(90.0);

    // Longitude degrees shrink toward the poles; size the pad for the
    // latitude in the band closest to a pole.
    let band_lat = (center.y().abs() + lat_pad).min(90.0);
    let cos_band = band_lat.to_radians().cos();
    let lon_pad = if cos_band < 1e-9 {
        180.0
    } else {
        ((radius_meters / (METERS_PER_DEGREE_LON_EQUATOR * cos_band)) * PAD_SAFETY).min(180.0)
    };

    let envelope = |min_x: f64, max_x: f64| {
        AABB::from_corners(
            IndexedBuilding::anchor(min_x, min_lat),
            IndexedBuilding::anchor(max_x, max_lat),
        )
    };

    if lon_pad >= 180.0 {
        return vec![envelope(-180.0, 180.0)];
    }

    let min_lon = center.x() - lon_pad;
    let max_lon = center.x() + lon_pad;

    if min_lon < -180.0 {
        vec![envelope(min_lon + 360.0, 180.0), envelope(-180.0, max_lon)]
    } else if max_lon > 180.0 {
        vec![envelope(min_lon, 180.0), envelope(-180.0, max_lon - 360.0)]
    } else {
        vec![envelope(min_lon, max_lon)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::spatial::bounding_box;

    fn index_with(points: &[(BuildingId, f64, f64)]) -> BuildingIndex {
        let mut index = BuildingIndex::new(DistanceMetric::Haversine);
        for (id, lat, lon) in points {
            index.insert(*id, &Point::new(*lon, *lat));
        }
        index
    }

    #[test]
    fn test_within_radius_finds_center_point() {
        let index = index_with(&[(1, 55.0, 37.0)]);

        let hits = index
            .within_radius(&Point::new(37.0, 55.0), 10.0)
            .unwrap();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_within_radius_excludes_distant_point() {
        // ~10km north of the query center.
        let index = index_with(&[(1, 55.09, 37.0)]);

        let hits = index
            .within_radius(&Point::new(37.0, 55.0), 10.0)
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_within_radius_sorted_nearest_first() {
        let index = index_with(&[(1, 55.02, 37.0), (2, 55.001, 37.0), (3, 55.01, 37.0)]);

        let hits = index
            .within_radius(&Point::new(37.0, 55.0), 5_000.0)
            .unwrap();
        assert_eq!(hits, vec![2, 3, 1]);
    }

    #[test]
    fn test_within_radius_rejects_bad_input() {
        let index = index_with(&[(1, 55.0, 37.0)]);

        let err = index
            .within_radius(&Point::new(37.0, 55.0), 0.0)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));

        let err = index
            .within_radius(&Point::new(200.0, 55.0), 100.0)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));

        let err = index
            .within_radius(&Point::new(37.0, 95.0), 100.0)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[test]
    fn test_within_radius_across_antimeridian() {
        let index = index_with(&[(1, 0.0, 179.95), (2, 0.0, -179.95)]);

        // Both sides of the date line are within ~12km of each other.
        let hits = index
            .within_radius(&Point::new(179.95, 0.0), 20_000.0)
            .unwrap();
        assert_eq!(hits, vec![1, 2]);
    }

    #[test]
    fn test_within_bbox_boundary_inclusive() {
        let index = index_with(&[(1, 55.0, 37.0), (2, 56.0, 38.0)]);

        let bbox = bounding_box(54.0, 36.0, 55.0, 37.0).unwrap();
        assert_eq!(index.within_bbox(&bbox), vec![1]);
    }

    #[test]
    fn test_within_bbox_degenerate_corners() {
        let index = index_with(&[(1, 55.0, 37.0)]);

        let bbox = bounding_box(55.0, 37.0, 55.0, 37.0).unwrap();
        assert_eq!(index.within_bbox(&bbox), vec![1]);

        let miss = bounding_box(55.1, 37.1, 55.1, 37.1).unwrap();
        assert!(index.within_bbox(&miss).is_empty());
    }

    #[test]
    fn test_remove_entry() {
        let mut index = index_with(&[(1, 55.0, 37.0), (2, 55.0, 37.5)]);

        assert!(index.remove(1));
        assert!(!index.remove(1));
        assert_eq!(index.len(), 1);

        let hits = index
            .within_radius(&Point::new(37.0, 55.0), 100_000.0)
            .unwrap();
        assert_eq!(hits, vec![2]);
    }

    #[test]
    fn test_polar_radius_query() {
        let index = index_with(&[(1, 89.9, 0.0), (2, 89.9, 180.0)]);

        // Near the pole every longitude is close; the widened envelope must
        // not lose candidates.
        let hits = index
            .within_radius(&Point::new(0.0, 90.0), 50_000.0)
            .unwrap();
        assert_eq!(hits.len(), 2);
    }
}
