//! Initial map viewport derived from the user and destination points.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geo::{wrap_longitude, GeoPoint};

/// Fallback center when nothing is known yet: downtown San Francisco.
const DEFAULT_CENTER_LAT: f64 = 37.78825;
const DEFAULT_CENTER_LNG: f64 = -122.4324;

const MAX_LATITUDE_DELTA: f64 = 180.0;
const MAX_LONGITUDE_DELTA: f64 = 360.0;

/// Visible map area: a center plus angular spans on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    /// True when `point` lies within `center ± delta / 2` on both axes. Longitude
    /// distance is measured across the antimeridian when that is shorter.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let half_lat = self.latitude_delta / 2.0;
        let half_lng = self.longitude_delta / 2.0;
        (point.latitude() - self.center.latitude()).abs() <= half_lat
            && wrap_longitude(point.longitude() - self.center.longitude()).abs() <= half_lng
    }
}

/// Tuning for [`RegionConfig::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub fallback_latitude: f64,
    pub fallback_longitude: f64,
    /// Span used when only one point is known (city-block scale).
    pub local_span: f64,
    /// Lower bound on each delta when fitting two points.
    pub min_span: f64,
    /// Multiplier applied to the coordinate spread so points do not sit on the edge.
    pub padding_factor: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: DEFAULT_CENTER_LAT,
            fallback_longitude: DEFAULT_CENTER_LNG,
            local_span: 0.01,
            min_span: 0.01,
            padding_factor: 1.3,
        }
    }
}

impl RegionConfig {
    /// Region shown before any location is known.
    pub fn default_region(&self) -> Region {
        let center = GeoPoint::new(self.fallback_latitude, self.fallback_longitude)
            .unwrap_or_else(|_| fallback_center());
        self.local_region(center)
    }

    fn local_region(&self, center: GeoPoint) -> Region {
        Region {
            center,
            latitude_delta: self.local_span,
            longitude_delta: self.local_span,
        }
    }

    /// Fit the viewport to whichever of the two anchors are known.
    ///
    /// Longitude uses the shorter arc between the two points, so a pair straddling
    /// the antimeridian is centered on it. Deltas are capped at 180° latitude and
    /// 360° longitude.
    pub fn compute(&self, user: Option<GeoPoint>, destination: Option<GeoPoint>) -> Region {
        match (user, destination) {
            (None, None) => self.default_region(),
            (Some(point), None) | (None, Some(point)) => self.local_region(point),
            (Some(user), Some(destination)) => {
                let lat_spread = (user.latitude() - destination.latitude()).abs();
                let lng_sum = user.longitude() + destination.longitude();
                let raw_lng_spread = (user.longitude() - destination.longitude()).abs();
                let (center_lng, lng_spread) = if raw_lng_spread <= 180.0 {
                    (lng_sum / 2.0, raw_lng_spread)
                } else {
                    (wrap_longitude(lng_sum / 2.0 + 180.0), 360.0 - raw_lng_spread)
                };
                let center_lat = (user.latitude() + destination.latitude()) / 2.0;
                Region {
                    center: GeoPoint::from_trusted(center_lat, center_lng),
                    latitude_delta: (lat_spread * self.padding_factor)
                        .max(self.min_span)
                        .min(MAX_LATITUDE_DELTA),
                    longitude_delta: (lng_spread * self.padding_factor)
                        .max(self.min_span)
                        .min(MAX_LONGITUDE_DELTA),
                }
            }
        }
    }

    /// Spans must be positive and at most 180°; padding must be at least 1 so both
    /// anchors stay inside the region.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, span) in [("region.local_span", self.local_span), ("region.min_span", self.min_span)] {
            if !span.is_finite() || span <= 0.0 || span > MAX_LATITUDE_DELTA {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, {MAX_LATITUDE_DELTA}], got {span}"
                )));
            }
        }
        if !self.padding_factor.is_finite() || self.padding_factor < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "region.padding_factor must be finite and >= 1, got {}",
                self.padding_factor
            )));
        }
        Ok(())
    }
}

fn fallback_center() -> GeoPoint {
    GeoPoint::from_trusted(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG)
}

/// [`RegionConfig::compute`] with the default tuning.
pub fn compute_region(user: Option<GeoPoint>, destination: Option<GeoPoint>) -> Region {
    RegionConfig::default().compute(user, destination)
}
