//! Geographic primitives: validated points and great-circle helpers.
//!
//! An unknown position is always `Option<GeoPoint>::None`. There is no sentinel
//! coordinate, so `(0.0, 0.0)` in the Gulf of Guinea is a perfectly valid point.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GeoError;

/// Mean Earth radius used by the haversine helpers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Micro-degree scale used for hashable point keys.
const KEY_SCALE: f64 = 1_000_000.0;

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = RawGeoPoint::deserialize(de)?;
        GeoPoint::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

impl GeoPoint {
    /// Validate and build a point. Latitude must be in [-90, 90] and longitude in
    /// [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point from constants already known to be in range.
    pub(crate) const fn from_trusted(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point from an optional pair, as handed over by location stores and
    /// driver records. Missing or invalid components yield `None`.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Self::new(latitude?, longitude?).ok()
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lon1) = (self.latitude.to_radians(), self.longitude.to_radians());
        let (lat2, lon2) = (other.latitude.to_radians(), other.longitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;
        let sin_dlat = (dlat * 0.5).sin();
        let sin_dlon = (dlon * 0.5).sin();
        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Initial compass bearing from `self` toward `other`, in degrees within [0, 360).
    /// Identical points give 0.
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        if self == other {
            return 0.0;
        }
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlon = (other.longitude - self.longitude).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        let bearing = y.atan2(x).to_degrees();
        bearing.rem_euclid(360.0)
    }

    /// Shift by the given degrees, clamping latitude to the poles and wrapping
    /// longitude into [-180, 180]. Non-finite offsets are treated as zero.
    pub fn offset_by(&self, dlat: f64, dlon: f64) -> GeoPoint {
        let dlat = if dlat.is_finite() { dlat } else { 0.0 };
        let dlon = if dlon.is_finite() { dlon } else { 0.0 };
        GeoPoint {
            latitude: (self.latitude + dlat).clamp(-90.0, 90.0),
            longitude: wrap_longitude(self.longitude + dlon),
        }
    }

    /// Hashable key at micro-degree precision.
    pub fn key(&self) -> (i64, i64) {
        (
            (self.latitude * KEY_SCALE).round() as i64,
            (self.longitude * KEY_SCALE).round() as i64,
        )
    }
}

/// Fold any finite longitude into [-180, 180].
pub(crate) fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}
