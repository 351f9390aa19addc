//! Session configuration.

use crate::clustering::DEFAULT_GRID_SIZE;
use crate::geometry::LatLng;
use crate::store::DEFAULT_LABEL_PREFIX;
use crate::viewport::{DEFAULT_CLUSTERING_THRESHOLD, MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Synthetic data generated at session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seeding iterations. Each adds one point and one square polygon.
    pub count: usize,
    /// Corner of the seeding area.
    pub origin: LatLng,
    /// Extent of the seeding area in degrees, on both axes.
    pub spread: f64,
    /// Edge of each seeded square polygon, in degrees.
    pub polygon_size: f64,
    /// Seed for the random generator, so runs are reproducible.
    pub rng_seed: u64,
    /// Iterations per chunk. `None` seeds everything in one pass.
    pub chunk_size: Option<usize>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            count: 0,
            origin: LatLng::new(-28.024, 140.887),
            spread: 20.0,
            polygon_size: 0.1,
            rng_seed: 0,
            chunk_size: None,
        }
    }
}

/// Settings for one mapping session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Zoom level at or above which features are shown individually.
    pub clustering_threshold: u8,
    pub initial_zoom: f64,
    pub initial_center: LatLng,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Prefix of marker labels (`T1`, `T2`, ...).
    pub marker_label_prefix: String,
    /// Cluster cell edge in screen pixels.
    pub grid_size: f64,
    pub seed: SeedConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clustering_threshold: DEFAULT_CLUSTERING_THRESHOLD,
            initial_zoom: 3.0,
            initial_center: LatLng::new(-28.024, 140.887),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            marker_label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            seed: SeedConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.clustering_threshold) {
            return Err(ConfigError::Invalid(format!(
                "clustering_threshold {} is outside {}..={}",
                self.clustering_threshold, self.min_zoom, self.max_zoom
            )));
        }
        if !self.initial_zoom.is_finite() {
            return Err(ConfigError::Invalid("initial_zoom must be finite".into()));
        }
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        if !self.initial_center.is_finite() || !self.seed.origin.is_finite() {
            return Err(ConfigError::Invalid("coordinates must be finite".into()));
        }
        if !(self.seed.spread.is_finite() && self.seed.spread >= 0.0) {
            return Err(ConfigError::Invalid("seed.spread must be non-negative".into()));
        }
        if !(self.seed.polygon_size.is_finite() && self.seed.polygon_size > 0.0) {
            return Err(ConfigError::Invalid("seed.polygon_size must be positive".into()));
        }
        if self.seed.chunk_size == Some(0) {
            return Err(ConfigError::Invalid("seed.chunk_size must be at least 1".into()));
        }
        Ok(())
    }
}
