//! Marker synthesis: driver records plus the user position become display markers.
//!
//! Markers are rebuilt from scratch on every input change. Identifiers are derived
//! from driver ids only, so the map surface can diff markers across rebuilds and keep
//! the selection highlight on the right pin.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::drivers::{DriverId, DriverRecord};
use crate::error::ConfigError;
use crate::geo::GeoPoint;
use crate::pricing::{EstimateConfig, TripEstimate};

/// Identifier the map surface uses for the destination pin.
pub const DESTINATION_MARKER_ID: &str = "destination";

/// Half-width, in degrees, of the box drivers without coordinates are scattered in.
const DEFAULT_SCATTER_DEGREES: f64 = 0.005;
/// Largest accepted scatter half-width.
const MAX_SCATTER_DEGREES: f64 = 1.0;

/// Icon the surface should draw for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerIcon {
    Driver,
    SelectedDriver,
    DestinationPin,
}

/// Where a marker position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    /// The driver record carried its own coordinates.
    Reported,
    /// No coordinates on the record; placed near the user.
    Scattered,
}

/// A renderable driver pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub driver_id: DriverId,
    pub position: GeoPoint,
    pub title: String,
    pub is_selected: bool,
    /// Rotation for the car icon: bearing from the driver toward the user.
    pub bearing_deg: f64,
    pub estimate: TripEstimate,
    pub placement: Placement,
}

impl Marker {
    pub fn icon(&self) -> MarkerIcon {
        if self.is_selected {
            MarkerIcon::SelectedDriver
        } else {
            MarkerIcon::Driver
        }
    }
}

/// Order of the produced markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerOrdering {
    /// Same order as the driver list.
    #[default]
    InputOrder,
    /// Haversine distance to the user ascending, ties by driver id ascending.
    ClosestFirst,
}

/// Inputs shared by every marker of one rebuild.
#[derive(Debug, Clone, Copy)]
pub struct MarkerContext<'a> {
    pub user: GeoPoint,
    pub destination: Option<GeoPoint>,
    pub selected: Option<&'a DriverId>,
}

impl<'a> MarkerContext<'a> {
    pub fn new(user: GeoPoint) -> Self {
        Self {
            user,
            destination: None,
            selected: None,
        }
    }

    pub fn with_destination(mut self, destination: Option<GeoPoint>) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_selected(mut self, selected: Option<&'a DriverId>) -> Self {
        self.selected = selected;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSynthesizer {
    pub estimates: EstimateConfig,
    pub ordering: MarkerOrdering,
    pub scatter_degrees: f64,
}

impl Default for MarkerSynthesizer {
    fn default() -> Self {
        Self {
            estimates: EstimateConfig::default(),
            ordering: MarkerOrdering::default(),
            scatter_degrees: DEFAULT_SCATTER_DEGREES,
        }
    }
}

impl MarkerSynthesizer {
    /// Scatter width must be finite and within [0, 1] degrees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scatter = self.scatter_degrees;
        if !scatter.is_finite() || !(0.0..=MAX_SCATTER_DEGREES).contains(&scatter) {
            return Err(ConfigError::Invalid(format!(
                "markers.scatter_degrees must be in [0, {MAX_SCATTER_DEGREES}], got {scatter}"
            )));
        }
        self.estimates.validate()
    }

    /// Build one marker per driver record. Does not mutate `drivers`.
    pub fn build(&self, drivers: &[DriverRecord], ctx: &MarkerContext<'_>) -> Vec<Marker> {
        let mut seen: HashMap<&DriverId, usize> = HashMap::with_capacity(drivers.len());
        let mut issued: HashSet<String> = HashSet::with_capacity(drivers.len());
        let mut markers: Vec<Marker> = drivers
            .iter()
            .map(|driver| {
                let occurrence = seen.entry(&driver.id).or_insert(0);
                *occurrence += 1;
                // A literal id such as "7#2" can collide with a suffixed repeat of "7".
                let mut id = marker_id(&driver.id, *occurrence);
                while issued.contains(&id) {
                    *occurrence += 1;
                    id = marker_id(&driver.id, *occurrence);
                }
                issued.insert(id.clone());
                self.marker_for(driver, id, ctx)
            })
            .collect();

        if self.ordering == MarkerOrdering::ClosestFirst {
            let user = ctx.user;
            markers.sort_by(|a, b| {
                let da = a.position.distance_km(&user);
                let db = b.position.distance_km(&user);
                da.partial_cmp(&db)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.driver_id.cmp(&b.driver_id))
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        markers
    }

    fn marker_for(&self, driver: &DriverRecord, id: String, ctx: &MarkerContext<'_>) -> Marker {
        let (position, placement) = match driver.position() {
            Some(position) => (position, Placement::Reported),
            None => (
                scatter_near(&ctx.user, &driver.id, self.scatter_degrees),
                Placement::Scattered,
            ),
        };
        let title = match driver.display_name() {
            name if name.is_empty() => id.clone(),
            name => name,
        };

        Marker {
            id,
            driver_id: driver.id.clone(),
            position,
            title,
            is_selected: ctx.selected == Some(&driver.id),
            bearing_deg: position.bearing_to(&ctx.user),
            estimate: self
                .estimates
                .estimate(&position, &ctx.user, ctx.destination.as_ref()),
            placement,
        }
    }
}

/// Marker identifier for a driver. Repeated driver ids get an occurrence suffix so
/// identifiers stay unique within one rebuild.
pub fn marker_id(driver_id: &DriverId, occurrence: usize) -> String {
    if occurrence <= 1 {
        format!("driver-{driver_id}")
    } else {
        format!("driver-{driver_id}#{occurrence}")
    }
}

/// [`MarkerSynthesizer::build`] with default settings, no destination and no selection.
pub fn build_markers(drivers: &[DriverRecord], user: GeoPoint) -> Vec<Marker> {
    MarkerSynthesizer::default().build(drivers, &MarkerContext::new(user))
}

/// Place a driver without coordinates inside `±half_width` degrees of the user.
/// The offset is seeded from the driver id, so it is stable across rebuilds.
fn scatter_near(user: &GeoPoint, driver_id: &DriverId, half_width: f64) -> GeoPoint {
    let mut rng = StdRng::seed_from_u64(stable_hash(driver_id.as_str()));
    if !half_width.is_finite() {
        return *user;
    }
    let half_width = half_width.abs().min(MAX_SCATTER_DEGREES);
    if half_width == 0.0 {
        return *user;
    }
    let dlat = rng.gen_range(-half_width..=half_width);
    let dlon = rng.gen_range(-half_width..=half_width);
    user.offset_by(dlat, dlon)
}

/// FNV-1a; stable across builds, unlike `DefaultHasher`.
fn stable_hash(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id: &str, position: Option<(f64, f64)>) -> DriverRecord {
        DriverRecord {
            id: DriverId::new(id),
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            latitude: position.map(|p| p.0),
            longitude: position.map(|p| p.1),
            profile_image_url: None,
            car_image_url: None,
            car_seats: 4,
            rating: Some(4.5),
        }
    }

    fn user() -> GeoPoint {
        GeoPoint::new(37.7749, -122.4194).expect("user")
    }

    #[test]
    fn scattered_positions_are_stable_and_bounded() {
        let drivers = vec![driver("1", None), driver("2", None)];
        let first = build_markers(&drivers, user());
        let second = build_markers(&drivers, user());
        assert_eq!(first, second);

        for marker in &first {
            assert_eq!(marker.placement, Placement::Scattered);
            assert!((marker.position.latitude() - user().latitude()).abs() <= DEFAULT_SCATTER_DEGREES);
            assert!((marker.position.longitude() - user().longitude()).abs() <= DEFAULT_SCATTER_DEGREES);
        }
        assert_ne!(first[0].position, first[1].position);
    }

    #[test]
    fn duplicate_driver_ids_get_distinct_marker_ids() {
        let drivers = vec![driver("7", None), driver("7", None)];
        let markers = build_markers(&drivers, user());
        assert_eq!(markers[0].id, "driver-7");
        assert_eq!(markers[1].id, "driver-7#2");
    }

    #[test]
    fn literal_suffix_in_driver_id_does_not_collide() {
        let drivers = vec![driver("7", None), driver("7", None), driver("7#2", None)];
        let ids: Vec<String> = build_markers(&drivers, user()).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["driver-7", "driver-7#2", "driver-7#2#2"]);

        let reordered = vec![driver("7#2", None), driver("7", None), driver("7", None)];
        let ids: HashSet<String> =
            build_markers(&reordered, user()).into_iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn oversized_scatter_stays_valid_and_does_not_panic() {
        let synthesizer = MarkerSynthesizer {
            scatter_degrees: 1e308,
            ..MarkerSynthesizer::default()
        };
        let user = GeoPoint::new(10.0, 170.0).expect("user");
        let markers = synthesizer.build(&[driver("1", None)], &MarkerContext::new(user));
        let position = markers[0].position;
        assert!((position.latitude() - 10.0).abs() <= MAX_SCATTER_DEGREES);
        assert!(GeoPoint::new(position.latitude(), position.longitude()).is_ok());
        assert!(matches!(synthesizer.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn empty_name_falls_back_to_marker_id() {
        let mut record = driver("3", Some((37.78, -122.41)));
        record.first_name.clear();
        record.last_name.clear();
        let markers = build_markers(&[record], user());
        assert_eq!(markers[0].title, "driver-3");
    }

    #[test]
    fn selected_driver_gets_selected_icon() {
        let drivers = vec![driver("1", Some((37.78, -122.41))), driver("2", Some((37.77, -122.40)))];
        let selected = DriverId::new("2");
        let ctx = MarkerContext::new(user()).with_selected(Some(&selected));
        let markers = MarkerSynthesizer::default().build(&drivers, &ctx);
        assert_eq!(markers[0].icon(), MarkerIcon::Driver);
        assert_eq!(markers[1].icon(), MarkerIcon::SelectedDriver);
    }

    #[test]
    fn stable_hash_matches_fnv1a_reference() {
        assert_eq!(stable_hash(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(stable_hash("a"), 0xaf63_dc4c_8601_ec8c);
    }
}
