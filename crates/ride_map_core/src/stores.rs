//! Read-only views of the shared location and selection stores.
//!
//! The screen only reads these; whoever owns the stores writes them and then notifies
//! the screen through [`crate::screen::MapScreen::refresh`].

use crate::drivers::DriverId;
use crate::geo::GeoPoint;

pub trait LocationStore {
    fn user_location(&self) -> Option<GeoPoint>;
    fn destination(&self) -> Option<GeoPoint>;
}

pub trait SelectionStore {
    fn selected_driver(&self) -> Option<DriverId>;
}

/// Plain location values, for hosts that keep the store elsewhere and for tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationSnapshot {
    pub user: Option<GeoPoint>,
    pub destination: Option<GeoPoint>,
}

impl LocationSnapshot {
    pub fn new(user: Option<GeoPoint>, destination: Option<GeoPoint>) -> Self {
        Self { user, destination }
    }
}

impl LocationStore for LocationSnapshot {
    fn user_location(&self) -> Option<GeoPoint> {
        self.user
    }

    fn destination(&self) -> Option<GeoPoint> {
        self.destination
    }
}

/// Fixed selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSelection(pub Option<DriverId>);

impl SelectionStore for StaticSelection {
    fn selected_driver(&self) -> Option<DriverId> {
        self.0.clone()
    }
}
