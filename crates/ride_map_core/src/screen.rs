//! The map screen: the single owner that turns store and feed notifications into
//! markers, a directions overlay, debounced viewport fits and a render description.
//!
//! Hosts call [`MapScreen::set_driver_feed`] and [`MapScreen::refresh`] when their
//! data changes, [`MapScreen::tick`] from their frame or timer loop, and
//! [`MapScreen::view`] to find out what to draw.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::config::MapConfig;
use crate::directions::{DirectionsOverlay, DirectionsState};
use crate::drivers::{DriverFeed, DriverId};
use crate::error::DirectionsError;
use crate::geo::GeoPoint;
use crate::markers::{
    Marker, MarkerContext, MarkerIcon, MarkerSynthesizer, DESTINATION_MARKER_ID,
};
use crate::region::{Region, RegionConfig};
use crate::routing::{build_route_provider, RouteProvider};
use crate::stores::{LocationStore, SelectionStore};
use crate::viewport::{FitCoordinator, FitOutcome, FitRequest, MapSurface};

/// Destination pin descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationMarker {
    pub id: &'static str,
    pub position: GeoPoint,
    pub title: &'static str,
    pub icon: MarkerIcon,
}

impl DestinationMarker {
    fn at(position: GeoPoint) -> Self {
        Self {
            id: DESTINATION_MARKER_ID,
            position,
            title: "Destination",
            icon: MarkerIcon::DestinationPin,
        }
    }
}

/// Everything the map surface needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub region: Region,
    pub markers: Vec<Marker>,
    pub destination: Option<DestinationMarker>,
    /// Route polyline, origin first.
    pub route: Option<Vec<GeoPoint>>,
}

/// What the screen renders in place of, or as, the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScreenView {
    /// Driver data still loading or the user position unknown. Takes precedence
    /// over `Error`.
    Loading,
    /// The driver feed failed; shown inline.
    Error(String),
    Map(MapScene),
}

pub struct MapScreen {
    region_config: RegionConfig,
    synthesizer: MarkerSynthesizer,
    show_directions: bool,
    feed: DriverFeed,
    user: Option<GeoPoint>,
    destination: Option<GeoPoint>,
    selected: Option<DriverId>,
    markers: Vec<Marker>,
    directions: DirectionsOverlay,
    fit: FitCoordinator,
    last_fit_inputs: Option<FitRequest>,
}

impl MapScreen {
    pub fn new(config: &MapConfig, provider: Arc<dyn RouteProvider>) -> Self {
        Self {
            region_config: config.region,
            synthesizer: config.markers,
            show_directions: config.show_directions,
            feed: DriverFeed::Loading,
            user: None,
            destination: None,
            selected: None,
            markers: Vec::new(),
            directions: DirectionsOverlay::new(provider),
            fit: FitCoordinator::new(config.fit),
            last_fit_inputs: None,
        }
    }

    /// Build the route provider described by `config.directions` as well.
    pub fn from_config(config: &MapConfig) -> Result<Self, DirectionsError> {
        let provider = build_route_provider(&config.directions)?;
        Ok(Self::new(config, Arc::from(provider)))
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn directions_state(&self) -> DirectionsState {
        self.directions.state()
    }

    pub fn directions(&self) -> &DirectionsOverlay {
        &self.directions
    }

    pub fn fit_coordinator(&self) -> &FitCoordinator {
        &self.fit
    }

    /// Driver data source changed.
    pub fn set_driver_feed(&mut self, now: Instant, feed: DriverFeed) {
        if self.feed == feed {
            return;
        }
        self.feed = feed;
        self.rebuild_markers();
        self.notify_fit(now);
    }

    /// Location or selection store changed.
    pub fn refresh<L, S>(&mut self, now: Instant, locations: &L, selection: &S)
    where
        L: LocationStore + ?Sized,
        S: SelectionStore + ?Sized,
    {
        let user = locations.user_location();
        let destination = locations.destination();
        let selected = selection.selected_driver();

        let markers_stale =
            user != self.user || destination != self.destination || selected != self.selected;
        self.user = user;
        self.destination = destination;
        self.selected = selected;

        if self.show_directions {
            self.directions.update(user, destination);
        }
        if markers_stale {
            self.rebuild_markers();
        }
        self.notify_fit(now);
    }

    /// Apply finished route requests and fire a due viewport fit.
    pub fn tick<M: MapSurface + ?Sized>(&mut self, now: Instant, surface: &mut M) -> FitOutcome {
        if self.directions.drain_results() > 0 {
            self.notify_fit(now);
        }
        self.fit.poll(now, surface)
    }

    fn rebuild_markers(&mut self) {
        self.markers = match (self.feed.drivers(), self.user) {
            (Some(drivers), Some(user)) => {
                let ctx = MarkerContext::new(user)
                    .with_destination(self.destination)
                    .with_selected(self.selected.as_ref());
                self.synthesizer.build(drivers, &ctx)
            }
            _ => Vec::new(),
        };
        debug!(markers = self.markers.len(), "rebuilt driver markers");
    }

    fn visible_destination(&self) -> Option<GeoPoint> {
        if self.show_directions {
            self.destination
        } else {
            None
        }
    }

    /// Re-schedule the fit only when the points to fit actually changed; selection
    /// or estimate changes alone do not move the camera.
    fn notify_fit(&mut self, now: Instant) {
        let destination = self.visible_destination();
        let state = self.directions.state();
        let inputs = self.fit.fit_request(&self.markers, destination, state);
        if self.last_fit_inputs.as_ref() == Some(&inputs) {
            return;
        }
        self.fit.on_change(now, &self.markers, destination, state);
        self.last_fit_inputs = Some(inputs);
    }

    pub fn view(&self) -> ScreenView {
        // Loading wins over a feed error until the user position is known.
        let Some(user) = self.user else {
            return ScreenView::Loading;
        };
        match &self.feed {
            DriverFeed::Loading => return ScreenView::Loading,
            DriverFeed::Failed(message) => return ScreenView::Error(message.clone()),
            DriverFeed::Loaded(_) => {}
        }

        let controller = self.directions.controller();
        let show_overlay = self.show_directions && controller.show_destination();
        let destination = if show_overlay {
            self.destination.map(DestinationMarker::at)
        } else {
            None
        };
        let route = if self.show_directions {
            controller.route().map(|route| route.points.clone())
        } else {
            None
        };

        ScreenView::Map(MapScene {
            region: self.region_config.compute(Some(user), self.destination),
            markers: self.markers.clone(),
            destination,
            route,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::DriverRecord;
    use crate::stores::{LocationSnapshot, StaticSelection};

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).expect("point")
    }

    fn driver(id: &str) -> DriverRecord {
        DriverRecord {
            id: DriverId::new(id),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            latitude: Some(37.776),
            longitude: Some(-122.418),
            profile_image_url: None,
            car_image_url: None,
            car_seats: 4,
            rating: None,
        }
    }

    #[test]
    fn loading_until_user_and_feed_are_known() {
        let mut screen = MapScreen::from_config(&MapConfig::default()).expect("screen");
        let now = Instant::now();
        assert_eq!(screen.view(), ScreenView::Loading);

        screen.set_driver_feed(now, DriverFeed::Loaded(vec![driver("1")]));
        assert_eq!(screen.view(), ScreenView::Loading);

        let locations = LocationSnapshot::new(Some(point(37.7749, -122.4194)), None);
        screen.refresh(now, &locations, &StaticSelection::default());
        match screen.view() {
            ScreenView::Map(scene) => {
                assert_eq!(scene.markers.len(), 1);
                assert!(scene.destination.is_none());
                assert!(scene.route.is_none());
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn failed_feed_is_shown_inline_once_user_is_known() {
        let mut screen = MapScreen::from_config(&MapConfig::default()).expect("screen");
        let now = Instant::now();
        screen.set_driver_feed(now, DriverFeed::Failed("timeout".to_string()));
        assert_eq!(screen.view(), ScreenView::Loading);

        let locations = LocationSnapshot::new(Some(point(37.7749, -122.4194)), None);
        screen.refresh(now, &locations, &StaticSelection::default());
        assert_eq!(screen.view(), ScreenView::Error("timeout".to_string()));
        assert!(screen.markers().is_empty());
    }

    #[test]
    fn selection_change_does_not_reschedule_fit() {
        let config = MapConfig::default().with_show_directions(false);
        let mut screen = MapScreen::from_config(&config).expect("screen");
        let t0 = Instant::now();
        let locations = LocationSnapshot::new(Some(point(37.7749, -122.4194)), None);
        screen.set_driver_feed(t0, DriverFeed::Loaded(vec![driver("1")]));
        screen.refresh(t0, &locations, &StaticSelection::default());
        let due = screen.fit_coordinator().pending_due_at();
        assert!(due.is_some());

        let later = t0 + std::time::Duration::from_millis(200);
        screen.refresh(later, &locations, &StaticSelection(Some(DriverId::new("1"))));
        assert!(screen.markers()[0].is_selected);
        assert_eq!(screen.fit_coordinator().pending_due_at(), due);
    }
}
