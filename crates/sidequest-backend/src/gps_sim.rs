//! Simulated GPS producer for demos.
//!
//! Walks a circular path around the start position, exercising the same
//! mutation API a real phone would. Also rotates through a small set of
//! demo objectives and popup messages so the overlay has something to
//! show with no real producers attached.

use std::time::Duration;

use sidequest_core::WorldStore;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Radius of the circular demo path, in degrees (roughly 200 m).
const PATH_RADIUS_DEG: f64 = 0.002;

/// Angle advanced per position update, in radians.
const ANGULAR_STEP_RAD: f64 = 0.02;

/// Time between demo objective rotations.
const OBJECTIVE_PERIOD: Duration = Duration::from_secs(20);

/// Time between demo popup messages.
const MESSAGE_PERIOD: Duration = Duration::from_secs(15);

/// How long a demo popup stays visible before it is hidden again.
const MESSAGE_LINGER: Duration = Duration::from_millis(3_500);

/// Popup display timeout sent with each demo message.
const MESSAGE_TIMEOUT_MS: u64 = 3_000;

const DEMO_OBJECTIVES: &[&str] = &[
    "Explore the Civic Center district",
    "Find the hidden courtyard",
    "Seek out the street merchant",
    "Investigate the strange noise nearby",
];

const DEMO_MESSAGES: &[&str] = &[
    "Quest Updated!",
    "New area discovered",
    "You sense something watching you...",
    "Achievement: Urban Wanderer",
];

/// Run the simulated GPS producer until the shutdown signal fires.
///
/// Each tick advances the walker along the circular path and writes the
/// new position through [`WorldStore::set_position`], with the heading
/// kept tangent to the path.
pub async fn run_gps_sim(
    store: WorldStore,
    start_lat: f64,
    start_lon: f64,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut angle: f64 = 0.0;
    let mut objective_idx: usize = 0;
    let mut message_idx: usize = 0;
    let start = Instant::now();
    let mut last_objective = start;
    let mut last_message = start;
    let mut message_shown_at: Option<Instant> = None;

    info!(start_lat, start_lon, period_ms = %period.as_millis(), "simulated GPS producer started");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => {
                info!("simulated GPS producer stopping");
                return;
            }
        }

        angle += ANGULAR_STEP_RAD;
        let lat = PATH_RADIUS_DEG.mul_add(angle.cos(), start_lat);
        let lon = PATH_RADIUS_DEG.mul_add(angle.sin(), start_lon);
        // Heading tangent to the circle, compass degrees.
        let heading = (angle.to_degrees() + 90.0).rem_euclid(360.0);

        let nearby = store.set_position(lat, lon, Some(heading)).await;
        debug!(lat, lon, heading, nearby, "simulated GPS step");

        if last_objective.elapsed() >= OBJECTIVE_PERIOD {
            if let Some(text) = DEMO_OBJECTIVES.get(objective_idx) {
                store.set_objective(*text).await;
                info!(objective = text, "demo objective rotated");
            }
            objective_idx = objective_idx.wrapping_add(1);
            if objective_idx >= DEMO_OBJECTIVES.len() {
                objective_idx = 0;
            }
            last_objective = Instant::now();
        }

        if last_message.elapsed() >= MESSAGE_PERIOD {
            if let Some(text) = DEMO_MESSAGES.get(message_idx) {
                store.set_message(*text, MESSAGE_TIMEOUT_MS).await;
                info!(message = text, "demo message shown");
            }
            message_idx = message_idx.wrapping_add(1);
            if message_idx >= DEMO_MESSAGES.len() {
                message_idx = 0;
            }
            last_message = Instant::now();
            message_shown_at = Some(last_message);
        }

        // Hide the popup a moment after its display timeout passes.
        if message_shown_at.is_some_and(|shown| shown.elapsed() >= MESSAGE_LINGER) {
            store.clear_message().await;
            message_shown_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use sidequest_core::gazetteer::Gazetteer;
    use sidequest_core::store::DEFAULT_POI_RADIUS_KM;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn walker_moves_and_stops_on_shutdown() {
        let store = WorldStore::new(37.7749, -122.4194, Gazetteer::new(), DEFAULT_POI_RADIUS_KM);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_gps_sim(
            store.clone(),
            37.7749,
            -122.4194,
            Duration::from_millis(200),
            shutdown_rx,
        ));

        tokio::time::advance(Duration::from_millis(1_000)).await;
        tokio::task::yield_now().await;

        let snapshot = store.snapshot().await;
        let moved = (snapshot.player.lat - 37.7749).abs() > 1e-9
            || (snapshot.player.lon + 122.4194).abs() > 1e-9;
        assert!(moved, "walker never advanced along the path");

        // The path stays within the POI radius of the start position.
        assert!(!snapshot.pois.is_empty());

        let _ = shutdown_tx.send(true);
        assert!(handle.await.is_ok());
    }
}
