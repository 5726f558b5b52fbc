//! The exclusively-owned world state store and its mutation API.
//!
//! [`WorldStore`] is the only way to touch the shared [`WorldState`]. Every
//! mutation takes the write lock once, applies its whole update, and
//! releases it, so concurrent readers can never observe a partially-updated
//! record (for example `encounter_active` true with no name). Readers get
//! cloned snapshots, never a reference into the live record.
//!
//! Geographic coordinates are deliberately not validated: producers are
//! trusted to send sane values, and the permissive contract is part of the
//! external interface. The gap is documented here rather than papered over.

use std::sync::Arc;

use sidequest_types::{DangerLevel, ObservationResult, OverlayMessage, WorldState};
use tokio::sync::RwLock;
use tracing::debug;

use crate::gazetteer::Gazetteer;

/// Default radius for the nearby-POI recomputation, in kilometers.
pub const DEFAULT_POI_RADIUS_KM: f64 = 1.5;

/// Synchronized accessor for the single shared [`WorldState`].
///
/// Cheap to clone; all clones share the same underlying state. The store
/// owns the gazetteer so the derived POI list can never go stale relative
/// to the player position.
#[derive(Debug, Clone)]
pub struct WorldStore {
    state: Arc<RwLock<WorldState>>,
    gazetteer: Gazetteer,
    poi_radius_km: f64,
}

impl WorldStore {
    /// Create a store seeded at the given start position.
    ///
    /// The POI list is populated immediately so the very first broadcast
    /// already carries the surroundings.
    pub fn new(start_lat: f64, start_lon: f64, gazetteer: Gazetteer, poi_radius_km: f64) -> Self {
        let mut state = WorldState::initial(start_lat, start_lon);
        state.pois = gazetteer.nearby(start_lat, start_lon, poi_radius_km);
        Self {
            state: Arc::new(RwLock::new(state)),
            gazetteer,
            poi_radius_km,
        }
    }

    /// Update the player position, recomputing the nearby POI list.
    ///
    /// When `heading` is `None` the previous heading is kept. Returns the
    /// number of POIs now in range (for the producer's acknowledgement).
    pub async fn set_position(&self, lat: f64, lon: f64, heading: Option<f64>) -> usize {
        let pois = self.gazetteer.nearby(lat, lon, self.poi_radius_km);
        let count = pois.len();

        let mut state = self.state.write().await;
        state.player.lat = lat;
        state.player.lon = lon;
        if let Some(heading) = heading {
            state.player.heading = heading;
        }
        state.pois = pois;
        drop(state);

        debug!(lat, lon, nearby_pois = count, "position updated");
        count
    }

    /// Replace the objective wholesale. Empty string is accepted.
    pub async fn set_objective(&self, text: impl Into<String>) {
        let mut state = self.state.write().await;
        state.objective = text.into();
    }

    /// Set the transient message, overwriting any pending one.
    ///
    /// Last-write-wins by design: there is no message queue.
    pub async fn set_message(&self, text: impl Into<String>, timeout_ms: u64) {
        let mut state = self.state.write().await;
        state.message = OverlayMessage {
            text: text.into(),
            visible: true,
            timeout_ms,
        };
    }

    /// Hide the current message without changing its text.
    ///
    /// Used by demo producers to end a popup early; viewers also time the
    /// popup out locally via `timeout_ms`.
    pub async fn clear_message(&self) {
        let mut state = self.state.write().await;
        state.message.visible = false;
    }

    /// Set the danger level and encounter fields in one atomic write.
    ///
    /// Caller contract: `encounter_name` must be `None` unless
    /// `encounter_active` is true. The store does not auto-derive the name.
    pub async fn set_danger(
        &self,
        danger_level: DangerLevel,
        encounter_active: bool,
        encounter_name: Option<String>,
    ) {
        let mut state = self.state.write().await;
        state.danger_level = danger_level;
        state.encounter_active = encounter_active;
        state.encounter_name = encounter_name;
    }

    /// Apply a full producer result in one atomic write.
    ///
    /// The composite path used by the vision pipeline: objective, the
    /// danger/encounter triple, and the environment summary always update;
    /// the message updates only when the result marks it visible and
    /// non-empty, otherwise the existing message is left untouched.
    pub async fn apply_observation(&self, result: &ObservationResult) {
        let mut state = self.state.write().await;
        state.objective = result.objective.clone();
        state.danger_level = result.danger_level;
        state.encounter_active = result.encounter_active;
        state.encounter_name = result.encounter_name.clone();
        state.environment = result.environment_summary.clone();

        if result.message_visible && !result.message_text.is_empty() {
            state.message = OverlayMessage {
                text: result.message_text.clone(),
                visible: true,
                timeout_ms: sidequest_types::requests::DEFAULT_MESSAGE_TIMEOUT_MS,
            };
        }
    }

    /// Replace the entire world state (operator/demo tooling).
    pub async fn replace(&self, new_state: WorldState) {
        let mut state = self.state.write().await;
        *state = new_state;
    }

    /// An immutable point-in-time copy of the world state.
    ///
    /// Safe to serialize and send without risk of concurrent mutation; the
    /// live record is never exposed.
    pub async fn snapshot(&self) -> WorldState {
        self.state.read().await.clone()
    }
}
