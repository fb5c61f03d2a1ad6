//! Error types for each concern of the map core.
//!
//! Only [`GeoError`] and [`ConfigError`] ever reach callers. Directions and surface
//! failures are recovered inside their owning component and only logged.

use thiserror::Error;

/// Rejected coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("coordinate is not a finite number")]
    NotFinite,
}

/// Failure of a routing provider request.
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[cfg(feature = "http")]
    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("directions provider returned HTTP status {0}")]
    Status(u16),
    #[error("directions provider error: {0}")]
    Api(String),
    #[error("no route between origin and destination")]
    NoRoute,
    #[error("could not decode route geometry: {0}")]
    Decode(String),
}

/// Failure of an imperative command sent to the map surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("map surface is not mounted yet")]
    NotReady,
    #[error("map surface rejected the command: {0}")]
    Rejected(String),
}

/// Failure loading a [`crate::config::MapConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}
