//! Test helpers for common test setup and utilities.
//!
//! Sample coordinates, driver fixtures, scripted route providers and recording map
//! surfaces shared by unit and integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::drivers::{DriverId, DriverRecord};
use crate::error::{DirectionsError, SurfaceError};
use crate::geo::GeoPoint;
use crate::routing::{Route, RouteProvider};
use crate::viewport::{FitRequest, MapSurface};

/// Downtown San Francisco.
pub const SF: (f64, f64) = (37.7749, -122.4194);
/// Downtown Oakland.
pub const OAKLAND: (f64, f64) = (37.8044, -122.2712);

/// # Panics
///
/// Panics if the coordinates are out of range.
pub fn point((latitude, longitude): (f64, f64)) -> GeoPoint {
    GeoPoint::new(latitude, longitude).expect("test point should be valid")
}

pub fn sf() -> GeoPoint {
    point(SF)
}

pub fn oakland() -> GeoPoint {
    point(OAKLAND)
}

/// Builder for [`DriverRecord`] fixtures.
#[derive(Debug, Clone)]
pub struct DriverFixture {
    record: DriverRecord,
}

impl DriverFixture {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            record: DriverRecord {
                first_name: "Driver".to_string(),
                last_name: id.clone(),
                id: DriverId::new(id),
                latitude: None,
                longitude: None,
                profile_image_url: None,
                car_image_url: None,
                car_seats: 4,
                rating: Some(4.8),
            },
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.record.latitude = Some(latitude);
        self.record.longitude = Some(longitude);
        self
    }

    pub fn named(mut self, first: &str, last: &str) -> Self {
        self.record.first_name = first.to_string();
        self.record.last_name = last.to_string();
        self
    }

    pub fn build(self) -> DriverRecord {
        self.record
    }
}

/// `count` drivers on a small grid north-east of `origin`, ids `"1"..=count`.
pub fn drivers_near(origin: GeoPoint, count: usize) -> Vec<DriverRecord> {
    (0..count)
        .map(|i| {
            let step = (i + 1) as f64 * 0.001;
            let lat = origin.latitude() + step;
            let lng = origin.longitude() + step * ((i % 3) as f64 - 1.0);
            DriverFixture::new((i + 1).to_string()).at(lat, lng).build()
        })
        .collect()
}

/// Route provider that replays scripted outcomes in call order. When the script runs
/// out, every further call fails with [`DirectionsError::NoRoute`].
#[derive(Debug, Default)]
pub struct ScriptedRouteProvider {
    script: Mutex<VecDeque<Result<(), DirectionsError>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(GeoPoint, GeoPoint)>>,
}

impl ScriptedRouteProvider {
    /// `Ok(())` entries answer with a straight two-point route.
    pub fn new(script: Vec<Result<(), DirectionsError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always_ok() -> Self {
        Self::new((0..64).map(|_| Ok(())).collect())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<(GeoPoint, GeoPoint)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl RouteProvider for ScriptedRouteProvider {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((origin, destination));
        }
        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(Err(DirectionsError::NoRoute));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        next.map(|()| Route {
            points: vec![origin, destination],
            distance_km: origin.distance_km(&destination),
            duration_secs: 600.0,
        })
    }
}

/// Map surface that records every fit command.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub fits: Vec<FitRequest>,
}

impl MapSurface for RecordingSurface {
    fn fit_to_points(&mut self, request: &FitRequest) -> Result<(), SurfaceError> {
        self.fits.push(request.clone());
        Ok(())
    }
}

/// Map surface whose native view is not mounted yet.
#[derive(Debug, Default)]
pub struct UnmountedSurface {
    pub attempts: usize,
}

impl MapSurface for UnmountedSurface {
    fn fit_to_points(&mut self, _request: &FitRequest) -> Result<(), SurfaceError> {
        self.attempts += 1;
        Err(SurfaceError::NotReady)
    }
}
