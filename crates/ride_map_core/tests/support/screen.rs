use std::sync::Arc;
use std::time::Instant;

use ride_map_core::directions::DirectionsState;
use ride_map_core::drivers::{DriverFeed, DriverId, DriverRecord};
use ride_map_core::geo::GeoPoint;
use ride_map_core::routing::RouteProvider;
use ride_map_core::screen::MapScreen;
use ride_map_core::stores::{LocationSnapshot, StaticSelection};
use ride_map_core::test_helpers::RecordingSurface;
use ride_map_core::MapConfig;

use super::deadline;

/// Screen plus the stores and surface a host would own, driven by a virtual clock
/// that starts at construction.
pub struct ScreenHarness {
    pub screen: MapScreen,
    pub locations: LocationSnapshot,
    pub selection: StaticSelection,
    pub surface: RecordingSurface,
    pub start: Instant,
}

impl ScreenHarness {
    pub fn new(config: &MapConfig, provider: Arc<dyn RouteProvider>) -> Self {
        Self {
            screen: MapScreen::new(config, provider),
            locations: LocationSnapshot::default(),
            selection: StaticSelection::default(),
            surface: RecordingSurface::default(),
            start: Instant::now(),
        }
    }

    pub fn at(&self, offset_ms: u64) -> Instant {
        self.start + super::ms(offset_ms)
    }

    pub fn set_locations(&mut self, offset_ms: u64, user: Option<GeoPoint>, destination: Option<GeoPoint>) {
        self.locations = LocationSnapshot::new(user, destination);
        let now = self.at(offset_ms);
        self.screen.refresh(now, &self.locations, &self.selection);
    }

    pub fn select(&mut self, offset_ms: u64, driver: Option<&str>) {
        self.selection = StaticSelection(driver.map(DriverId::new));
        let now = self.at(offset_ms);
        self.screen.refresh(now, &self.locations, &self.selection);
    }

    pub fn load_drivers(&mut self, offset_ms: u64, drivers: Vec<DriverRecord>) {
        let now = self.at(offset_ms);
        self.screen.set_driver_feed(now, DriverFeed::Loaded(drivers));
    }

    /// Tick at `offset_ms` until directions leave `Pending`, or panic after the
    /// real-time deadline.
    pub fn settle_directions(&mut self, offset_ms: u64) -> DirectionsState {
        let limit = deadline();
        let now = self.at(offset_ms);
        while self.screen.directions_state() == DirectionsState::Pending {
            assert!(Instant::now() < limit, "directions never settled");
            self.screen.tick(now, &mut self.surface);
            std::thread::sleep(super::ms(2));
        }
        self.screen.directions_state()
    }

    pub fn tick(&mut self, offset_ms: u64) {
        let now = self.at(offset_ms);
        self.screen.tick(now, &mut self.surface);
    }
}
