//! Route fetching and the simulated ride playback.
//!
//! A route is fetched once per tracking session; a fixed-interval tick then
//! advances a position index along the geometry while the ETA decays. The
//! tick math lives in [`RouteSimulation`] as a pure step function so tests
//! can drive it with deterministic dice rolls.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::models::Coordinate;

/// Fixed simulation tick interval.
pub const TICK_INTERVAL: Duration = Duration::from_millis(900);
/// The viewport recenters on the moving position every this many steps.
const RECENTER_EVERY: usize = 5;
/// Fraction of ticks on which the ETA is re-derived. Cosmetic tunable, not a
/// physical model; only the monotone non-increasing behavior is contractual.
const ETA_DECAY_CHANCE: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct Route {
    pub geometry: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_min: u32,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    /// Metres.
    distance: f64,
    /// Seconds.
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

pub struct RouteClient {
    client: reqwest::Client,
    base_url: String,
}

impl RouteClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Fetches a driving route between two points. Distance and duration are
    /// taken from the response, never recomputed locally. On failure the
    /// route simply stays unloaded; no retry is attempted here.
    pub async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> anyhow::Result<Route> {
        // OSRM takes lng,lat order.
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, start.lng, start.lat, end.lng, end.lat
        );

        let response: OsrmResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(route) = response.routes.into_iter().next() else {
            anyhow::bail!("routing service returned no routes");
        };

        let geometry = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| Coordinate::new(lat, lng))
            .collect();

        Ok(Route {
            geometry,
            distance_km: (route.distance / 1000.0 * 10.0).round() / 10.0,
            duration_min: (route.duration / 60.0).round() as u32,
        })
    }
}

/// Outcome of one simulation step.
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    pub moved: bool,
    pub recenter: bool,
    pub arrived: bool,
}

/// Time-stepped playback of a fetched route. The index only moves forward
/// and the ETA only moves down (floor 1).
pub struct RouteSimulation {
    route: Route,
    index: usize,
    eta_min: u32,
    running: bool,
}

impl RouteSimulation {
    pub fn new(route: Route) -> Self {
        let eta_min = route.duration_min;
        Self {
            route,
            index: 0,
            eta_min,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn eta_min(&self) -> u32 {
        self.eta_min
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.route.geometry.get(self.index).copied()
    }

    /// Arrived exactly when the index sits on the final point of a non-empty
    /// route.
    pub fn arrived(&self) -> bool {
        !self.route.geometry.is_empty() && self.index == self.route.geometry.len() - 1
    }

    /// One tick with a fresh random roll.
    pub fn tick(&mut self) -> TickOutcome {
        let roll = rand::thread_rng().gen::<f64>();
        self.advance(roll)
    }

    /// One tick with an injected roll in `[0, 1)`. Advances the index by one
    /// while running and not yet arrived; recenters every fifth step; on a
    /// low roll, decays the ETA by the fraction of the route already covered.
    pub fn advance(&mut self, roll: f64) -> TickOutcome {
        if !self.running || self.arrived() || self.route.geometry.is_empty() {
            return TickOutcome {
                moved: false,
                recenter: false,
                arrived: self.arrived(),
            };
        }

        self.index += 1;
        let recenter = self.index % RECENTER_EVERY == 0;

        if self.eta_min > 1 && roll < ETA_DECAY_CHANCE {
            let fraction = self.index as f64 / self.route.geometry.len() as f64;
            let decayed = (self.eta_min as f64 * (1.0 - fraction)).floor() as u32;
            self.eta_min = decayed.max(1);
        }

        TickOutcome {
            moved: true,
            recenter,
            arrived: self.arrived(),
        }
    }
}

/// One position update pushed to SSE subscribers per tick.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingUpdate {
    pub booking_id: String,
    pub index: usize,
    pub position: Coordinate,
    pub eta_min: u32,
    pub recenter: bool,
    pub arrived: bool,
}

/// A live tracking session: the ticking task plus the channel its updates
/// fan out on. Dropping the session must abort the task so a stale timer
/// cannot outlive its view.
pub struct TrackingSession {
    pub task: JoinHandle<()>,
    pub updates: broadcast::Sender<TrackingUpdate>,
    pub distance_km: f64,
    pub initial_eta_min: u32,
}

impl TrackingSession {
    /// Spawns the tick loop for a loaded route. Ticks are strictly
    /// sequential: the next one is scheduled only after the previous one's
    /// synchronous work is done (delayed missed-tick behavior).
    pub fn spawn(booking_id: String, route: Route) -> Self {
        let (tx, _) = broadcast::channel(64);
        let distance_km = route.distance_km;
        let initial_eta_min = route.duration_min;

        let updates = tx.clone();
        let task = tokio::spawn(async move {
            let mut sim = RouteSimulation::new(route);
            sim.start();

            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first interval tick fires immediately; skip it so the taxi
            // leaves the pickup point after one full period.
            interval.tick().await;

            loop {
                interval.tick().await;
                let outcome = sim.tick();
                let Some(position) = sim.position() else {
                    break;
                };

                // Ignore send errors: no subscriber is fine.
                let _ = updates.send(TrackingUpdate {
                    booking_id: booking_id.clone(),
                    index: sim.index(),
                    position,
                    eta_min: sim.eta_min(),
                    recenter: outcome.recenter,
                    arrived: outcome.arrived,
                });

                if outcome.arrived {
                    tracing::info!(booking_id = %booking_id, "simulated ride arrived");
                    break;
                }
            }
        });

        Self {
            task,
            updates: tx,
            distance_km,
            initial_eta_min,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackingUpdate> {
        self.updates.subscribe()
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
