//! Time and price estimates shown on driver markers.
//!
//! Durations come from straight-line distance at an average city speed; the fare is a
//! flat per-minute rate over pickup plus trip time.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geo::GeoPoint;

/// Free-flow average speed used when no route is available, in km/h.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Fare per estimated minute, in currency units.
pub const DEFAULT_PRICE_PER_MINUTE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub average_speed_kmh: f64,
    pub price_per_minute: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            price_per_minute: DEFAULT_PRICE_PER_MINUTE,
        }
    }
}

/// Estimates attached to a driver marker. Trip fields are only known once a
/// destination is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripEstimate {
    pub pickup_minutes: f64,
    pub trip_minutes: Option<f64>,
    pub total_minutes: Option<f64>,
    pub price: Option<f64>,
}

impl EstimateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.average_speed_kmh.is_finite() || self.average_speed_kmh <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "average_speed_kmh must be positive, got {}",
                self.average_speed_kmh
            )));
        }
        if !self.price_per_minute.is_finite() || self.price_per_minute < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "price_per_minute must be non-negative, got {}",
                self.price_per_minute
            )));
        }
        Ok(())
    }

    /// Minutes to cover the great-circle distance between two points.
    pub fn travel_minutes(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        let speed = self.average_speed_kmh.max(1.0);
        from.distance_km(to) / speed * 60.0
    }

    /// Estimate for a driver at `driver` picking up at `user`, optionally continuing
    /// to `destination`.
    ///
    /// Formula: `price = (pickup_minutes + trip_minutes) * price_per_minute`, rounded
    /// to cents.
    pub fn estimate(
        &self,
        driver: &GeoPoint,
        user: &GeoPoint,
        destination: Option<&GeoPoint>,
    ) -> TripEstimate {
        let pickup_minutes = self.travel_minutes(driver, user);
        let trip_minutes = destination.map(|destination| self.travel_minutes(user, destination));
        let total_minutes = trip_minutes.map(|trip| pickup_minutes + trip);
        let price = total_minutes.map(|total| round_cents(total * self.price_per_minute));
        TripEstimate {
            pickup_minutes,
            trip_minutes,
            total_minutes,
            price,
        }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
