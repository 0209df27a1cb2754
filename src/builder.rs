//! Catalog builder for flexible construction.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::seed::Seed;
use crate::spatial::DistanceMetric;
use crate::types::Config;
use std::path::PathBuf;

/// Builder combining configuration with an optional seed source.
///
/// # Examples
///
/// ```rust
/// use orgdex::{Catalog, Seed};
///
/// let seed = Seed::from_json(r#"{
///     "buildings": [{ "id": 1, "address": "1 Main St", "lat": 55.0, "lon": 37.0 }]
/// }"#)?;
///
/// let catalog = Catalog::builder().seed(seed).build()?;
/// assert_eq!(catalog.stats().building_count, 1);
/// # Ok::<(), orgdex::CatalogError>(())
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    config: Config,
    seed: Option<Seed>,
    seed_path: Option<PathBuf>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the metric used for radius queries.
    pub fn distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.config.distance_metric = metric;
        self
    }

    /// Toggle level/parent consistency enforcement.
    pub fn enforce_tree_levels(mut self, enforce: bool) -> Self {
        self.config.enforce_tree_levels = enforce;
        self
    }

    /// Load this seed document on build.
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Read and load a seed file on build.
    pub fn seed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    /// Build the catalog, applying seed sources in path-then-document
    /// order. Seed errors are fatal and abort the build.
    pub fn build(self) -> Result<Catalog> {
        let catalog = Catalog::with_config(self.config);

        if let Some(path) = self.seed_path {
            catalog.load_seed_path(path)?;
        }
        if let Some(seed) = self.seed {
            catalog.load_seed(&seed)?;
        }

        Ok(catalog)
    }
}
