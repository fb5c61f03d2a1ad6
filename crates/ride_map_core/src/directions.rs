//! Directions overlay: tracks the route request for the current (origin, destination)
//! pair and decides whether the destination pin and route line may be drawn.
//!
//! [`DirectionsController`] is the pure state machine. It hands out a [`RouteRequest`]
//! ticket whenever the pair changes and accepts the outcome through
//! [`DirectionsController::complete`]. Tickets carry a generation number; outcomes for
//! any generation but the current one are dropped, so a slow success can never clear
//! a newer failure.
//!
//! [`DirectionsOverlay`] runs tickets on worker threads against a [`RouteProvider`]
//! and applies results on the owner's thread through a channel.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DirectionsError;
use crate::geo::GeoPoint;
use crate::routing::{Route, RouteProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DirectionsState {
    #[default]
    Idle,
    Pending,
    Ready,
    Failed,
}

/// A request the controller wants executed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub generation: u64,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

/// What [`DirectionsController::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(DirectionsState),
    /// The ticket no longer matches the current inputs.
    Stale,
}

#[derive(Debug, Default)]
pub struct DirectionsController {
    state: DirectionsState,
    generation: u64,
    origin: Option<GeoPoint>,
    destination: Option<GeoPoint>,
    route: Option<Route>,
    last_error: Option<String>,
}

impl DirectionsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DirectionsState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        self.destination
    }

    /// Route polyline, only while `Ready`.
    pub fn route(&self) -> Option<&Route> {
        match self.state {
            DirectionsState::Ready => self.route.as_ref(),
            _ => None,
        }
    }

    /// Message of the most recent provider failure, kept for diagnostics only.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Destination pin is drawn while a destination exists and routing has not failed.
    pub fn show_destination(&self) -> bool {
        self.destination.is_some() && self.state != DirectionsState::Failed
    }

    /// Feed the current inputs. Returns a ticket only when the pair actually changed
    /// and both ends are known; repeated calls with the same pair are no-ops.
    pub fn update(
        &mut self,
        origin: Option<GeoPoint>,
        destination: Option<GeoPoint>,
    ) -> Option<RouteRequest> {
        if origin == self.origin && destination == self.destination {
            return None;
        }
        self.origin = origin;
        self.destination = destination;
        // Any in-flight ticket is now stale.
        self.generation += 1;
        self.route = None;

        match (origin, destination) {
            (Some(origin), Some(destination)) => {
                self.transition(DirectionsState::Pending);
                debug!(generation = self.generation, "issuing route request");
                Some(RouteRequest {
                    generation: self.generation,
                    origin,
                    destination,
                })
            }
            _ => {
                self.transition(DirectionsState::Idle);
                None
            }
        }
    }

    /// Drop the current pair without issuing a request, e.g. when directions are
    /// switched off for the screen.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.origin = None;
        self.destination = None;
        self.route = None;
        self.transition(DirectionsState::Idle);
    }

    /// Apply a provider outcome. Errors are logged and turned into `Failed`; they never
    /// propagate further.
    pub fn complete(
        &mut self,
        request: &RouteRequest,
        outcome: Result<Route, DirectionsError>,
    ) -> Completion {
        if request.generation != self.generation || self.state != DirectionsState::Pending {
            debug!(
                generation = request.generation,
                current = self.generation,
                "discarding stale route response"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(route) => {
                self.route = Some(route);
                self.last_error = None;
                self.transition(DirectionsState::Ready);
            }
            Err(err) => {
                warn!(error = %err, "directions request failed; hiding destination and route");
                self.route = None;
                self.last_error = Some(err.to_string());
                self.transition(DirectionsState::Failed);
            }
        }
        Completion::Applied(self.state)
    }

    fn transition(&mut self, next: DirectionsState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, "directions state changed");
            self.state = next;
        }
    }
}

struct RouteResult {
    request: RouteRequest,
    outcome: Result<Route, DirectionsError>,
}

/// Controller plus a provider. Requests run on short-lived worker threads; results are
/// applied when the owner calls [`DirectionsOverlay::drain_results`].
pub struct DirectionsOverlay {
    controller: DirectionsController,
    provider: Arc<dyn RouteProvider>,
    sender: Sender<RouteResult>,
    receiver: Receiver<RouteResult>,
    inflight: usize,
}

impl DirectionsOverlay {
    pub fn new(provider: Arc<dyn RouteProvider>) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();
        Self {
            controller: DirectionsController::new(),
            provider,
            sender,
            receiver,
            inflight: 0,
        }
    }

    pub fn controller(&self) -> &DirectionsController {
        &self.controller
    }

    pub fn state(&self) -> DirectionsState {
        self.controller.state()
    }

    /// Requests dispatched whose result has not been drained yet, stale ones included.
    pub fn inflight(&self) -> usize {
        self.inflight
    }

    /// Feed the current inputs; dispatches a request if the pair changed.
    /// Returns true when a request was dispatched.
    pub fn update(&mut self, origin: Option<GeoPoint>, destination: Option<GeoPoint>) -> bool {
        match self.controller.update(origin, destination) {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    fn dispatch(&mut self, request: RouteRequest) {
        self.inflight += 1;
        let sender = self.sender.clone();
        let provider = Arc::clone(&self.provider);
        std::thread::spawn(move || {
            let outcome = provider.route(request.origin, request.destination);
            // The overlay may have been dropped; nobody is interested then.
            let _ = sender.send(RouteResult { request, outcome });
        });
    }

    /// Apply every result that has arrived. Returns how many changed the state.
    pub fn drain_results(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.receiver.try_recv() {
            self.inflight = self.inflight.saturating_sub(1);
            if let Completion::Applied(_) = self.controller.complete(&result.request, result.outcome)
            {
                applied += 1;
            }
        }
        applied
    }

    /// Block up to `timeout` for the next result and apply it. Intended for tools and
    /// tests; interactive owners should poll [`DirectionsOverlay::drain_results`].
    pub fn wait_for_result(&mut self, timeout: std::time::Duration) -> Option<Completion> {
        let result = self.receiver.recv_timeout(timeout).ok()?;
        self.inflight = self.inflight.saturating_sub(1);
        Some(self.controller.complete(&result.request, result.outcome))
    }
}
