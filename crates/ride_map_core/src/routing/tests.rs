use std::time::Duration;

use super::google::GoogleDirectionsProvider;
use super::response::{
    parse_google_response, parse_osrm_response, GoogleDirectionsResponse, OsrmRouteResponse,
};
use super::RouteProvider;
use crate::error::DirectionsError;
use crate::geo::GeoPoint;

fn google(body: &str) -> Result<super::Route, DirectionsError> {
    let resp: GoogleDirectionsResponse = serde_json::from_str(body).expect("valid JSON");
    parse_google_response(resp)
}

fn osrm(body: &str) -> Result<super::Route, DirectionsError> {
    let resp: OsrmRouteResponse = serde_json::from_str(body).expect("valid JSON");
    parse_osrm_response(resp)
}

#[test]
fn google_ok_response_sums_legs() {
    let route = google(
        r#"{
            "status": "OK",
            "routes": [{
                "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"},
                "legs": [
                    {"distance": {"value": 1500, "text": "1.5 km"}, "duration": {"value": 300, "text": "5 mins"}},
                    {"distance": {"value": 500, "text": "0.5 km"}, "duration": {"value": 60, "text": "1 min"}}
                ]
            }]
        }"#,
    )
    .expect("route");
    assert_eq!(route.points.len(), 3);
    assert!((route.distance_km - 2.0).abs() < 1e-9);
    assert!((route.duration_secs - 360.0).abs() < 1e-9);
}

#[test]
fn google_zero_results_is_no_route() {
    let err = google(r#"{"status": "ZERO_RESULTS", "routes": []}"#).expect_err("no route");
    assert!(matches!(err, DirectionsError::NoRoute));
}

#[test]
fn google_denied_carries_message() {
    let err = google(
        r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "routes": []}"#,
    )
    .expect_err("denied");
    match err {
        DirectionsError::Api(detail) => {
            assert_eq!(detail, "REQUEST_DENIED: The provided API key is invalid.")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn google_single_point_polyline_is_no_route() {
    let err = google(
        r#"{"status": "OK", "routes": [{"overview_polyline": {"points": "_p~iF~ps|U"}, "legs": []}]}"#,
    )
    .expect_err("degenerate");
    assert!(matches!(err, DirectionsError::NoRoute));
}

#[test]
fn osrm_ok_response_swaps_coordinates() {
    let route = osrm(
        r#"{
            "code": "Ok",
            "routes": [{
                "distance": 2500.0,
                "duration": 420.0,
                "geometry": {"type": "LineString", "coordinates": [[13.4, 52.5], [13.41, 52.52]]}
            }]
        }"#,
    )
    .expect("route");
    assert_eq!(route.points[0], GeoPoint::new(52.5, 13.4).expect("point"));
    assert!((route.distance_km - 2.5).abs() < 1e-9);
    assert_eq!(route.duration_secs, 420.0);
}

#[test]
fn osrm_no_route_code() {
    let err = osrm(r#"{"code": "NoRoute", "message": "Impossible route", "routes": []}"#)
        .expect_err("no route");
    assert!(matches!(err, DirectionsError::NoRoute));
}

#[test]
fn osrm_invalid_coordinates_are_decode_errors() {
    let err = osrm(
        r#"{"code": "Ok", "routes": [{"distance": 1.0, "duration": 1.0, "geometry": {"coordinates": [[13.4, 152.5], [13.41, 52.52]]}}]}"#,
    )
    .expect_err("invalid");
    assert!(matches!(err, DirectionsError::Decode(_)));
}

#[test]
fn google_url_carries_origin_destination_and_key() {
    let provider =
        GoogleDirectionsProvider::new("secret", Duration::from_secs(1)).expect("client");
    let origin = GeoPoint::new(37.7749, -122.4194).expect("origin");
    let destination = GeoPoint::new(37.8044, -122.2712).expect("destination");
    let url = provider.request_url(origin, destination).expect("url");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("origin".to_string(), "37.774900,-122.419400".to_string())));
    assert!(pairs.contains(&("destination".to_string(), "37.804400,-122.271200".to_string())));
    assert!(pairs.contains(&("key".to_string(), "secret".to_string())));
}

#[test]
fn google_without_key_fails_without_network() {
    let provider = GoogleDirectionsProvider::new("", Duration::from_secs(1)).expect("client");
    let origin = GeoPoint::new(37.7749, -122.4194).expect("origin");
    let destination = GeoPoint::new(37.8044, -122.2712).expect("destination");
    let err = provider.route(origin, destination).expect_err("missing key");
    assert!(matches!(err, DirectionsError::Api(_)));
}
