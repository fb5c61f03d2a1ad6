//! Pluggable route providers for the directions overlay.
//!
//! Three backends, selectable via [`RouteProviderKind`]:
//!
//! - **`StraightLineRouteProvider`**: two-point polyline with a haversine estimate. No
//!   network access, used offline and in demos.
//! - **`GoogleDirectionsProvider`** (feature `http`): Google Directions JSON API,
//!   authenticated with an API key.
//! - **`OsrmRouteProvider`** (feature `http`): an OSRM HTTP endpoint.
//!
//! Network-backed providers are wrapped in a [`CachedRouteProvider`]. Failures are
//! never replaced by a fallback route: the overlay must show nothing rather than a
//! route the provider did not produce.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::error::DirectionsError;
use crate::geo::GeoPoint;
use crate::pricing::DEFAULT_AVERAGE_SPEED_KMH;

#[cfg(feature = "http")]
mod google;
#[cfg(feature = "http")]
mod osrm;
mod polyline;
#[cfg(feature = "http")]
mod response;
#[cfg(all(test, feature = "http"))]
mod tests;

#[cfg(feature = "http")]
pub use google::GoogleDirectionsProvider;
#[cfg(feature = "http")]
pub use osrm::OsrmRouteProvider;
pub use polyline::decode_polyline;

/// Environment variable consulted when a Google provider has no key configured.
pub const API_KEY_ENV: &str = "RIDE_MAP_DIRECTIONS_API_KEY";

const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 256;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// A drivable path between origin and destination.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    /// Polyline vertices, origin first.
    pub points: Vec<GeoPoint>,
    pub distance_km: f64,
    pub duration_secs: f64,
}

/// Which routing backend to use.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteProviderKind {
    /// Direct line between the two points, no external dependency.
    #[default]
    StraightLine,
    /// Google Directions API. A missing key falls back to [`API_KEY_ENV`].
    #[cfg(feature = "http")]
    Google {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
    },
    /// OSRM HTTP endpoint (e.g. `"http://localhost:5000"`).
    #[cfg(feature = "http")]
    Osrm { endpoint: String },
}

/// Provider construction settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionsConfig {
    pub provider: RouteProviderKind,
    pub timeout_secs: u64,
    /// Successful routes kept per (origin, destination) pair. 0 disables caching.
    pub cache_capacity: usize,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            provider: RouteProviderKind::default(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_capacity: DEFAULT_ROUTE_CACHE_CAPACITY,
        }
    }
}

/// Routing backend. Implementations must be `Send + Sync` so requests can run on
/// worker threads.
pub trait RouteProvider: Send + Sync {
    /// Compute a route. Any failure, including "no route", is an error.
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError>;
}

impl<P: RouteProvider + ?Sized> RouteProvider for Box<P> {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
        (**self).route(origin, destination)
    }
}

impl<P: RouteProvider + ?Sized> RouteProvider for std::sync::Arc<P> {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
        (**self).route(origin, destination)
    }
}

/// Straight segment from origin to destination at the average city speed.
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightLineRouteProvider;

impl RouteProvider for StraightLineRouteProvider {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
        let distance_km = origin.distance_km(&destination);
        let duration_secs = if distance_km > 0.0 {
            (distance_km / DEFAULT_AVERAGE_SPEED_KMH) * 3600.0
        } else {
            0.0
        };
        Ok(Route {
            points: vec![origin, destination],
            distance_km,
            duration_secs,
        })
    }
}

type PairKey = ((i64, i64), (i64, i64));

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the directional (origin, destination) pair at micro-degree precision.
/// Only successes are cached, so a failed pair is retried the next time it is asked for.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<PairKey, Route>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
        let key = (origin.key(), destination.key());

        // Fast path: cache hit
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(cached.clone());
            }
        }

        let route = self.inner.route(origin, destination)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, route.clone());
        }
        Ok(route)
    }
}

/// Construct a boxed [`RouteProvider`] from the directions settings.
///
/// - `StraightLine` is returned without caching.
/// - `Google` and `Osrm` are wrapped in a [`CachedRouteProvider`] unless
///   `cache_capacity` is 0.
pub fn build_route_provider(
    config: &DirectionsConfig,
) -> Result<Box<dyn RouteProvider>, DirectionsError> {
    let inner: Box<dyn RouteProvider> = match &config.provider {
        RouteProviderKind::StraightLine => return Ok(Box::new(StraightLineRouteProvider)),

        #[cfg(feature = "http")]
        RouteProviderKind::Google { api_key, endpoint } => {
            let api_key = api_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .or_else(|| std::env::var(API_KEY_ENV).ok())
                .unwrap_or_default();
            if api_key.is_empty() {
                tracing::warn!(
                    "no directions API key configured (set {}); every route request will fail",
                    API_KEY_ENV
                );
            }
            let timeout = std::time::Duration::from_secs(config.timeout_secs);
            let provider = match endpoint {
                Some(endpoint) => {
                    GoogleDirectionsProvider::with_endpoint(endpoint, &api_key, timeout)?
                }
                None => GoogleDirectionsProvider::new(&api_key, timeout)?,
            };
            Box::new(provider)
        }

        #[cfg(feature = "http")]
        RouteProviderKind::Osrm { endpoint } => Box::new(OsrmRouteProvider::new(
            endpoint,
            std::time::Duration::from_secs(config.timeout_secs),
        )?),
    };

    Ok(match NonZeroUsize::new(config.cache_capacity) {
        Some(capacity) => Box::new(CachedRouteProvider::new(inner, capacity)),
        None => inner,
    })
}

#[cfg(test)]
mod cache_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl RouteProvider for CountingProvider {
        fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route, DirectionsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DirectionsError::NoRoute);
            }
            StraightLineRouteProvider.route(origin, destination)
        }
    }

    fn pair() -> (GeoPoint, GeoPoint) {
        (
            GeoPoint::new(37.7749, -122.4194).expect("origin"),
            GeoPoint::new(37.8044, -122.2712).expect("destination"),
        )
    }

    #[test]
    fn caches_successes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: Arc::clone(&calls),
                fail: false,
            }),
            NonZeroUsize::new(4).expect("capacity"),
        );
        let (origin, destination) = pair();
        provider.route(origin, destination).expect("first");
        provider.route(origin, destination).expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.cached_len(), 1);

        // Direction matters.
        provider.route(destination, origin).expect("reverse");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn does_not_cache_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: Arc::clone(&calls),
                fail: true,
            }),
            NonZeroUsize::new(4).expect("capacity"),
        );
        let (origin, destination) = pair();
        assert!(provider.route(origin, destination).is_err());
        assert!(provider.route(origin, destination).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cached_len(), 0);
    }

    #[test]
    fn straight_line_default_is_uncached() {
        let provider = build_route_provider(&DirectionsConfig::default()).expect("provider");
        let (origin, destination) = pair();
        let route = provider.route(origin, destination).expect("route");
        assert_eq!(route.points, vec![origin, destination]);
        assert!(route.duration_secs > 0.0);
    }
}
