//! Debounced "fit the viewport to these points" commands.
//!
//! The coordinator owns a single pending-fit slot. Every input change replaces the
//! slot, so only the last change of a burst reaches the map surface, `delay` after it
//! happened. Time is supplied by the caller so the owner's event loop stays in charge
//! of scheduling.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::directions::DirectionsState;
use crate::error::{ConfigError, SurfaceError};
use crate::geo::GeoPoint;
use crate::markers::{Marker, DESTINATION_MARKER_ID};

const DEFAULT_FIT_DELAY_MS: u64 = 500;
const DEFAULT_EDGE_PADDING: f64 = 50.0;

/// Screen-space padding kept between fitted points and the map edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl EdgePadding {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for EdgePadding {
    fn default() -> Self {
        Self::uniform(DEFAULT_EDGE_PADDING)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub delay_ms: u64,
    pub padding: EdgePadding,
    pub animated: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_FIT_DELAY_MS,
            padding: EdgePadding::default(),
            animated: true,
        }
    }
}

impl FitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let EdgePadding {
            top,
            right,
            bottom,
            left,
        } = self.padding;
        if [top, right, bottom, left]
            .iter()
            .any(|edge| !edge.is_finite() || *edge < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "fit.padding edges must be finite and non-negative, got {:?}",
                self.padding
            )));
        }
        Ok(())
    }
}

/// Command sent to the map surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitRequest {
    /// Marker identifiers, aligned with `points`.
    pub identifiers: Vec<String>,
    pub points: Vec<GeoPoint>,
    pub padding: EdgePadding,
    pub animated: bool,
}

/// Imperative side of the native map view.
pub trait MapSurface {
    /// Move the camera so every point is visible. May fail before the view is mounted.
    fn fit_to_points(&mut self, request: &FitRequest) -> Result<(), SurfaceError>;
}

impl<S: MapSurface + ?Sized> MapSurface for &mut S {
    fn fit_to_points(&mut self, request: &FitRequest) -> Result<(), SurfaceError> {
        (**self).fit_to_points(request)
    }
}

/// Result of [`FitCoordinator::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitOutcome {
    /// Nothing scheduled.
    Idle,
    /// A fit is scheduled but not due yet.
    Waiting,
    Fitted,
    /// The surface refused; logged and dropped.
    SurfaceFailed(SurfaceError),
}

#[derive(Debug, Clone)]
struct PendingFit {
    due_at: Instant,
    request: FitRequest,
}

#[derive(Debug, Default)]
pub struct FitCoordinator {
    config: FitConfig,
    pending: Option<PendingFit>,
}

impl FitCoordinator {
    pub fn new(config: FitConfig) -> Self {
        Self {
            config,
            pending: None,
        }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// When the pending fit will fire, if any.
    pub fn pending_due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due_at)
    }

    pub fn pending_request(&self) -> Option<&FitRequest> {
        self.pending.as_ref().map(|pending| &pending.request)
    }

    /// Points the map should show: every marker, plus the destination unless routing
    /// to it has failed.
    pub fn fit_request(
        &self,
        markers: &[Marker],
        destination: Option<GeoPoint>,
        directions: DirectionsState,
    ) -> FitRequest {
        let mut identifiers: Vec<String> = markers.iter().map(|m| m.id.clone()).collect();
        let mut points: Vec<GeoPoint> = markers.iter().map(|m| m.position).collect();
        if let Some(destination) = destination {
            if directions != DirectionsState::Failed {
                identifiers.push(DESTINATION_MARKER_ID.to_string());
                points.push(destination);
            }
        }
        FitRequest {
            identifiers,
            points,
            padding: self.config.padding,
            animated: self.config.animated,
        }
    }

    /// React to a change of markers, destination or directions state. Replaces any
    /// pending fit. With no driver markers there is nothing to fit and the slot is
    /// cleared. Returns true when a fit is now scheduled.
    pub fn on_change(
        &mut self,
        now: Instant,
        markers: &[Marker],
        destination: Option<GeoPoint>,
        directions: DirectionsState,
    ) -> bool {
        if markers.is_empty() {
            if self.pending.take().is_some() {
                debug!("no markers left; cancelled pending viewport fit");
            }
            return false;
        }

        let request = self.fit_request(markers, destination, directions);
        let due_at = now + self.config.delay();
        if self.pending.is_some() {
            debug!("superseding pending viewport fit");
        }
        debug!(points = request.points.len(), "scheduled viewport fit");
        self.pending = Some(PendingFit { due_at, request });
        true
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Fire the pending fit if it is due. Surface failures are logged, never retried;
    /// the next input change schedules a fresh attempt.
    pub fn poll<S: MapSurface + ?Sized>(&mut self, now: Instant, surface: &mut S) -> FitOutcome {
        let due = match &self.pending {
            None => return FitOutcome::Idle,
            Some(pending) => pending.due_at <= now,
        };
        if !due {
            return FitOutcome::Waiting;
        }
        let Some(PendingFit { request, .. }) = self.pending.take() else {
            return FitOutcome::Idle;
        };

        match surface.fit_to_points(&request) {
            Ok(()) => FitOutcome::Fitted,
            Err(err) => {
                warn!(error = %err, "error fitting map to markers");
                FitOutcome::SurfaceFailed(err)
            }
        }
    }
}
