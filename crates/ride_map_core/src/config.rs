//! Screen configuration, loadable from JSON. Every field has a default, so a config
//! file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::markers::{MarkerOrdering, MarkerSynthesizer};
use crate::region::RegionConfig;
use crate::routing::{DirectionsConfig, RouteProviderKind};
use crate::viewport::FitConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub region: RegionConfig,
    pub markers: MarkerSynthesizer,
    pub fit: FitConfig,
    pub directions: DirectionsConfig,
    /// When false, no route is requested and neither destination pin nor route is drawn.
    pub show_directions: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            region: RegionConfig::default(),
            markers: MarkerSynthesizer::default(),
            fit: FitConfig::default(),
            directions: DirectionsConfig::default(),
            show_directions: true,
            log_level: "info".to_string(),
        }
    }
}

impl MapConfig {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break region or marker invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.region.validate()?;
        self.markers.validate()?;
        self.fit.validate()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json_str(&body)
    }

    pub fn with_show_directions(mut self, show: bool) -> Self {
        self.show_directions = show;
        self
    }

    pub fn with_route_provider(mut self, provider: RouteProviderKind) -> Self {
        self.directions.provider = provider;
        self
    }

    pub fn with_fit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.fit.delay_ms = delay_ms;
        self
    }

    pub fn with_marker_ordering(mut self, ordering: MarkerOrdering) -> Self {
        self.markers.ordering = ordering;
        self
    }
}
