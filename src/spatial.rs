//! Geographic predicates and validation leveraging the geo crate.
//!
//! Coordinates are degrees over SRID 4326: x = longitude, y = latitude.
//! Distances are always computed on a geographic model; a planar metric
//! would be wrong at catalog scale and is deliberately not offered.

use crate::error::{CatalogError, Result};
use geo::{Distance, Geodesic, Haversine, Intersects, Point, Rect};
use serde::{Deserialize, Serialize};

/// Distance metrics for radius queries.
///
/// - **Haversine**: spherical distance, fast and accurate enough for most
///   catalog queries
/// - **Geodesic**: ellipsoidal distance (Karney 2013), more accurate, slower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Haversine,
    Geodesic,
}

/// Calculate the distance between two points in meters using the given
/// metric.
///
/// # Examples
///
/// ```rust
/// use geo::Point;
/// use orgdex::spatial::{DistanceMetric, distance_between};
///
/// let nyc = Point::new(-74.0060, 40.7128);
/// let la = Point::new(-118.2437, 34.0522);
///
/// let dist = distance_between(&nyc, &la, DistanceMetric::Haversine);
/// assert!(dist > 3_900_000.0); // ~3,944 km
/// ```
pub fn distance_between(point1: &Point, point2: &Point, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => Haversine.distance(*point1, *point2),
        DistanceMetric::Geodesic => Geodesic.distance(*point1, *point2),
    }
}

/// Validates that a point has a finite longitude in [-180, 180] and a finite
/// latitude in [-90, 90]. Out-of-range input is rejected, never clamped.
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(CatalogError::InvalidInput(format!(
            "longitude must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(CatalogError::InvalidInput(format!(
            "latitude must be finite, got: {}",
            y
        )));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(CatalogError::InvalidInput(format!(
            "longitude out of range [-180.0, 180.0]: {}",
            x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(CatalogError::InvalidInput(format!(
            "latitude out of range [-90.0, 90.0]: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a search radius: finite and strictly positive.
pub fn validate_radius(radius_meters: f64) -> Result<()> {
    if !radius_meters.is_finite() {
        return Err(CatalogError::InvalidInput(format!(
            "radius must be finite, got: {}",
            radius_meters
        )));
    }

    if radius_meters <= 0.0 {
        return Err(CatalogError::InvalidInput(format!(
            "radius must be positive, got: {}",
            radius_meters
        )));
    }

    Ok(())
}

/// Create a bounding box from min/max corners, validating coordinate ranges
/// and corner order.
///
/// # Errors
///
/// Returns `InvalidInput` if any coordinate is out of range or if min > max
/// on either axis.
///
/// # Examples
///
/// ```rust
/// use orgdex::spatial::bounding_box;
///
/// // Manhattan
/// let bbox = bounding_box(40.70, -74.02, 40.80, -73.93).unwrap();
/// assert!(bounding_box(40.80, -74.02, 40.70, -73.93).is_err());
/// ```
pub fn bounding_box(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Rect> {
    validate_geographic_point(&Point::new(min_lon, min_lat))?;
    validate_geographic_point(&Point::new(max_lon, max_lat))?;

    if min_lon > max_lon {
        return Err(CatalogError::InvalidInput(format!(
            "min_lon ({}) must be <= max_lon ({})",
            min_lon, max_lon
        )));
    }
    if min_lat > max_lat {
        return Err(CatalogError::InvalidInput(format!(
            "min_lat ({}) must be <= max_lat ({})",
            min_lat, max_lat
        )));
    }

    Ok(Rect::new(
        geo::coord! { x: min_lon, y: min_lat },
        geo::coord! { x: max_lon, y: max_lat },
    ))
}

/// Boundary-inclusive point-in-box test (the intersection semantics of the
/// underlying geography engine, where a point on the edge is inside).
pub fn point_in_bbox(bbox: &Rect, point: &Point) -> bool {
    bbox.intersects(point)
}
