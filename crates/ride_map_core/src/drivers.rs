//! Driver records as served by the driver endpoint, and the feed state wrapping them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::GeoPoint;

/// Driver identifier. The endpoint serves integer ids; strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for DriverId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for DriverId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for DriverId {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(de)? {
            RawId::Int(id) => DriverId::from(id),
            RawId::Text(id) => DriverId(id),
        })
    }
}

/// One driver as returned by the driver endpoint. Never mutated by the map core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    pub id: DriverId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub car_image_url: Option<String>,
    #[serde(default)]
    pub car_seats: u32,
    #[serde(default, deserialize_with = "rating_from_number_or_text")]
    pub rating: Option<f64>,
}

/// Ratings come back as decimal strings (`"4.80"`) from SQL-backed endpoints.
fn rating_from_number_or_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRating {
        Number(f64),
        Text(String),
    }

    match Option::<RawRating>::deserialize(de)? {
        None => Ok(None),
        Some(RawRating::Number(value)) => Ok(Some(value)),
        Some(RawRating::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl DriverRecord {
    /// Reported position, if the record carries a valid one.
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Envelope of the driver endpoint: `{ "data": [ ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverListResponse {
    pub data: Vec<DriverRecord>,
}

impl DriverListResponse {
    pub fn from_json(body: &str) -> Result<Vec<DriverRecord>, serde_json::Error> {
        serde_json::from_str::<DriverListResponse>(body).map(|resp| resp.data)
    }
}

/// State of the external driver data source.
///
/// `Loaded(vec![])` is a successful empty list and renders zero markers; it is not
/// the same as `Loading`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DriverFeed {
    #[default]
    Loading,
    Failed(String),
    Loaded(Vec<DriverRecord>),
}

impl DriverFeed {
    pub fn drivers(&self) -> Option<&[DriverRecord]> {
        match self {
            DriverFeed::Loaded(drivers) => Some(drivers),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DriverFeed::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "data": [
            {
                "id": 1,
                "first_name": "James",
                "last_name": "Wilson",
                "profile_image_url": "https://example.com/p1.jpg",
                "car_image_url": "https://example.com/c1.png",
                "car_seats": 4,
                "rating": "4.80"
            },
            {
                "id": "2",
                "first_name": "David",
                "last_name": "Brown",
                "latitude": 37.78,
                "longitude": -122.41,
                "car_seats": 5,
                "rating": 4.6
            }
        ]
    }"#;

    #[test]
    fn parses_mixed_id_and_rating_encodings() {
        let drivers = DriverListResponse::from_json(PAYLOAD).expect("payload");
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].rating, Some(4.8));
        assert_eq!(drivers[1].rating, Some(4.6));
        assert_eq!(drivers[0].id, DriverId::new("1"));
        assert_eq!(drivers[1].id, DriverId::new("2"));
        assert!(drivers[0].position().is_none());
        assert!(drivers[1].position().is_some());
        assert_eq!(drivers[1].display_name(), "David Brown");
    }

    #[test]
    fn non_numeric_rating_is_an_error() {
        let body = r#"{"data": [{"id": 7, "rating": "excellent"}]}"#;
        assert!(DriverListResponse::from_json(body).is_err());
    }

    #[test]
    fn empty_list_is_distinct_from_loading() {
        let feed = DriverFeed::Loaded(Vec::new());
        assert_eq!(feed.drivers().map(|d| d.len()), Some(0));
        assert!(DriverFeed::Loading.drivers().is_none());
        assert!(DriverFeed::Failed("boom".into()).drivers().is_none());
    }
}
