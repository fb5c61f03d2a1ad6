use serde::Deserialize;

use super::polyline::decode_polyline;
use super::Route;
use crate::error::DirectionsError;
use crate::geo::GeoPoint;

#[derive(Deserialize)]
pub(super) struct GoogleDirectionsResponse {
    pub(super) status: String,
    #[serde(default)]
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) routes: Vec<GoogleRoute>,
}

#[derive(Deserialize)]
pub(super) struct GoogleRoute {
    pub(super) overview_polyline: GooglePolyline,
    #[serde(default)]
    pub(super) legs: Vec<GoogleLeg>,
}

#[derive(Deserialize)]
pub(super) struct GooglePolyline {
    pub(super) points: String,
}

#[derive(Deserialize)]
pub(super) struct GoogleLeg {
    pub(super) distance: GoogleValue,
    pub(super) duration: GoogleValue,
}

#[derive(Deserialize)]
pub(super) struct GoogleValue {
    /// Metres for distances, seconds for durations.
    pub(super) value: f64,
}

#[derive(Deserialize)]
pub(super) struct OsrmRouteResponse {
    pub(super) code: String,
    #[serde(default)]
    pub(super) message: Option<String>,
    pub(super) routes: Option<Vec<OsrmRoute>>,
}

#[derive(Deserialize)]
pub(super) struct OsrmRoute {
    pub(super) distance: f64, // metres
    pub(super) duration: f64, // seconds
    pub(super) geometry: OsrmGeometry,
}

#[derive(Deserialize)]
pub(super) struct OsrmGeometry {
    pub(super) coordinates: Vec<[f64; 2]>, // [lng, lat]
}

pub(super) fn parse_google_response(
    resp: GoogleDirectionsResponse,
) -> Result<Route, DirectionsError> {
    match resp.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Err(DirectionsError::NoRoute),
        other => {
            let detail = resp
                .error_message
                .filter(|msg| !msg.trim().is_empty())
                .map(|msg| format!("{other}: {msg}"))
                .unwrap_or_else(|| other.to_string());
            return Err(DirectionsError::Api(detail));
        }
    }

    let route = resp.routes.into_iter().next().ok_or(DirectionsError::NoRoute)?;
    let points = decode_polyline(&route.overview_polyline.points)?;
    if points.len() < 2 {
        return Err(DirectionsError::NoRoute);
    }

    let distance_m: f64 = route.legs.iter().map(|leg| leg.distance.value).sum();
    let duration_secs: f64 = route.legs.iter().map(|leg| leg.duration.value).sum();

    Ok(Route {
        points,
        distance_km: distance_m / 1000.0,
        duration_secs,
    })
}

pub(super) fn parse_osrm_response(resp: OsrmRouteResponse) -> Result<Route, DirectionsError> {
    match resp.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(DirectionsError::NoRoute),
        other => {
            let detail = match resp.message {
                Some(msg) if !msg.trim().is_empty() => format!("{other}: {msg}"),
                _ => other.to_string(),
            };
            return Err(DirectionsError::Api(detail));
        }
    }

    let route = resp
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or(DirectionsError::NoRoute)?;

    // OSRM returns [lng, lat]
    let points = route
        .geometry
        .coordinates
        .iter()
        .map(|c| GeoPoint::new(c[1], c[0]))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| DirectionsError::Decode(err.to_string()))?;
    if points.len() < 2 {
        return Err(DirectionsError::NoRoute);
    }

    Ok(Route {
        points,
        distance_km: route.distance / 1000.0,
        duration_secs: route.duration,
    })
}
