use std::time::Duration;

use reqwest::{blocking::Client, Url};

use super::response::{parse_osrm_response, OsrmRouteResponse};
use super::{Route, RouteProvider};
use crate::error::DirectionsError;
use crate::geo::GeoPoint;

/// Routes via an OSRM HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OsrmRouteProvider {
    client: Client,
    endpoint: String,
}

impl OsrmRouteProvider {
    /// Create a client for the given OSRM endpoint (e.g. `http://localhost:5000`).
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, DirectionsError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn request_url(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Url, DirectionsError> {
        let base = format!(
            "{}/route/v1/driving/{:.6},{:.6};{:.6},{:.6}",
            self.endpoint,
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude(),
        );
        let mut url = Url::parse(&base)
            .map_err(|err| DirectionsError::Api(format!("failed to build OSRM URL: {}", err)))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }
}

impl RouteProvider for OsrmRouteProvider {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
        let url = self.request_url(origin, destination)?;
        let response = self.client.get(url).send()?;
        // OSRM answers NoRoute with 400 and a JSON body; only give up early on other codes.
        let status = response.status();
        if !status.is_success() && status.as_u16() != 400 {
            return Err(DirectionsError::Status(status.as_u16()));
        }

        let parsed: OsrmRouteResponse = response.json()?;
        parse_osrm_response(parsed)
    }
}
