//! The fixed-rate world-state broadcaster.
//!
//! Runs for the lifetime of the process: every tick it serializes one
//! snapshot and fans the identical payload out to all connected viewers.
//! Broadcasting at a fixed cadence decoupled from mutation frequency
//! bounds the worst-case fan-out cost and smooths bursts from concurrent
//! producers into one payload per tick; viewers are never blocked on a
//! slow producer.

use std::time::Duration;

use sidequest_core::store::WorldStore;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Run the broadcast loop until the shutdown signal fires.
///
/// Per tick:
/// - zero viewers: nothing happens beyond the tick check (no snapshot,
///   no serialization)
/// - otherwise: one [`WorldStore::snapshot`], one `serde_json`
///   serialization, one send that reaches every receiver
///
/// Delivery to an individual viewer is the `WebSocket` task's problem; a
/// viewer that disconnects drops its receiver and is thereby deregistered
/// before the next tick. Cancellation via the watch channel is a clean
/// exit, not an error.
pub async fn run_broadcaster(
    store: WorldStore,
    tx: broadcast::Sender<String>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(period_ms = %period.as_millis(), "broadcaster started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if tx.receiver_count() == 0 {
                    continue;
                }

                let snapshot = store.snapshot().await;
                match serde_json::to_string(&snapshot) {
                    Ok(payload) => {
                        // Err means zero receivers, a normal race with the
                        // last viewer disconnecting mid-tick.
                        let delivered = tx.send(payload).unwrap_or(0);
                        debug!(viewers = delivered, "state broadcast");
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to serialize world state");
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("broadcaster shutting down");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sidequest_core::gazetteer::Gazetteer;
    use sidequest_core::store::DEFAULT_POI_RADIUS_KM;
    use sidequest_types::WorldState;

    use crate::state::BROADCAST_CAPACITY;

    use super::*;

    fn test_store() -> WorldStore {
        WorldStore::new(37.7749, -122.4194, Gazetteer::new(), DEFAULT_POI_RADIUS_KM)
    }

    #[tokio::test(start_paused = true)]
    async fn broadcasts_snapshots_at_the_tick_rate() {
        let store = test_store();
        let (tx, mut rx) = broadcast::channel(BROADCAST_CAPACITY);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        // Mutate before the first tick so the very first payload already
        // reflects the latest state.
        store.set_objective("Defeat the Dragon").await;

        let handle = tokio::spawn(run_broadcaster(
            store.clone(),
            tx,
            Duration::from_millis(100),
            shutdown_rx,
        ));

        tokio::time::advance(Duration::from_millis(250)).await;

        let payload = rx.recv().await.unwrap_or_default();
        let state: Option<WorldState> = serde_json::from_str(&payload).ok();
        assert!(state.is_some_and(|s| s.objective == "Defeat the Dragon"));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_viewer_does_not_disturb_the_rest() {
        let store = test_store();
        let (tx, mut keeper) = broadcast::channel(BROADCAST_CAPACITY);
        let quitter = tx.subscribe();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_broadcaster(
            store,
            tx.clone(),
            Duration::from_millis(100),
            shutdown_rx,
        ));

        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(keeper.recv().await.is_ok());

        // One viewer disconnects between ticks.
        drop(quitter);
        tokio::time::advance(Duration::from_millis(100)).await;

        // The registry no longer counts it, and the survivor still
        // receives payloads.
        assert_eq!(tx.receiver_count(), 1);
        assert!(keeper.recv().await.is_ok());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_viewers_means_no_payloads_are_produced() {
        let store = test_store();
        let (tx, rx) = broadcast::channel::<String>(BROADCAST_CAPACITY);
        // No receiver is alive while the loop ticks.
        drop(rx);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_broadcaster(
            store,
            tx.clone(),
            Duration::from_millis(100),
            shutdown_rx,
        ));

        tokio::time::advance(Duration::from_millis(500)).await;

        // A receiver subscribing now must see nothing queued from the
        // viewerless ticks.
        let mut late = tx.subscribe();
        let empty = late.try_recv();
        assert!(matches!(
            empty,
            Err(broadcast::error::TryRecvError::Empty)
        ));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_signal_stops_the_loop_cleanly() {
        let store = test_store();
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_broadcaster(
            store,
            tx,
            Duration::from_millis(100),
            shutdown_rx,
        ));

        shutdown_tx.send(true).unwrap_or_default();
        tokio::time::advance(Duration::from_millis(10)).await;

        let finished = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(finished, Ok(Ok(()))));
    }
}
