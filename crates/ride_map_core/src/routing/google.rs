use std::fmt;
use std::time::Duration;

use reqwest::{blocking::Client, Url};

use super::response::{parse_google_response, GoogleDirectionsResponse};
use super::{Route, RouteProvider};
use crate::error::DirectionsError;
use crate::geo::GeoPoint;

const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Google Directions API client.
#[derive(Clone)]
pub struct GoogleDirectionsProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl fmt::Debug for GoogleDirectionsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleDirectionsProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GoogleDirectionsProvider {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, DirectionsError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, timeout)
    }

    /// Point the client at a different base URL (proxies, test servers).
    pub fn with_endpoint(
        endpoint: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, DirectionsError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub(super) fn request_url(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Url, DirectionsError> {
        let mut url = Url::parse(&self.endpoint).map_err(|err| {
            DirectionsError::Api(format!("failed to build directions URL: {}", err))
        })?;
        url.query_pairs_mut()
            .append_pair("origin", &format_point(origin))
            .append_pair("destination", &format_point(destination))
            .append_pair("mode", "driving")
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

fn format_point(point: GeoPoint) -> String {
    format!("{:.6},{:.6}", point.latitude(), point.longitude())
}

impl RouteProvider for GoogleDirectionsProvider {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
        if self.api_key.trim().is_empty() {
            return Err(DirectionsError::Api("missing API key".to_string()));
        }

        let url = self.request_url(origin, destination)?;
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(DirectionsError::Status(response.status().as_u16()));
        }

        let parsed: GoogleDirectionsResponse = response.json()?;
        parse_google_response(parsed)
    }
}
