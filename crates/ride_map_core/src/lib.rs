//! Map region and driver marker core for a ride-hailing client.
//!
//! Turns the user position, an optional destination and the nearby-driver list into
//! a render description for a native map view: the initial viewport, one marker per
//! driver, a directions overlay and debounced "fit to markers" camera commands.

pub mod config;
pub mod directions;
pub mod drivers;
pub mod error;
pub mod geo;
pub mod logging;
pub mod markers;
pub mod pricing;
pub mod region;
pub mod routing;
pub mod screen;
pub mod stores;
pub mod viewport;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use config::MapConfig;
pub use error::{ConfigError, DirectionsError, GeoError, SurfaceError};
pub use geo::GeoPoint;
pub use screen::{MapScreen, ScreenView};
