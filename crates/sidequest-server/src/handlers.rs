//! REST endpoint handlers for the overlay API.
//!
//! Every mutation handler is fire-and-forget from the caller's side: it
//! acknowledges the write, it never returns a derived value beyond what
//! the original producers expect (the GPS producer gets its nearby-POI
//! count, the vision bot gets the decided triple).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Status document |
//! | `GET` | `/api/state` | Current world-state snapshot |
//! | `POST` | `/update` | Replace the entire world state |
//! | `POST` | `/api/location` | GPS position update |
//! | `POST` | `/api/camera` | Vision pipeline entry point |
//! | `POST` | `/api/objective` | Manual objective replacement |
//! | `POST` | `/api/message` | Manual message push |
//! | `POST` | `/api/danger` | Danger/encounter triple update |
//! | `POST` | `/api/reset` | Clear observation history (admin) |

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use sidequest_types::{
    CameraFrame, DangerUpdate, LocationUpdate, MessageUpdate, ObjectiveUpdate, WorldState,
};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /` -- status document for health checks.
pub async fn index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "SideQuest overlay backend running",
        "viewers": state.viewer_count(),
    }))
}

/// `GET /api/state` -- the current world-state snapshot.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<WorldState> {
    Json(state.store.snapshot().await)
}

/// `POST /update` -- replace the entire world state (operator tooling).
pub async fn update_state(
    State(state): State<Arc<AppState>>,
    Json(new_state): Json<WorldState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if new_state.encounter_name.is_some() != new_state.encounter_active {
        return Err(ApiError::Invalid(String::from(
            "encounter_name must be present exactly when encounter_active is true",
        )));
    }
    state.store.replace(new_state).await;
    Ok(Json(serde_json::json!({ "status": "updated" })))
}

/// `POST /api/location` -- position update from the phone GPS.
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LocationUpdate>,
) -> Json<serde_json::Value> {
    let nearby = state
        .store
        .set_position(update.lat, update.lon, update.heading)
        .await;

    Json(serde_json::json!({
        "status": "location_updated",
        "nearby_pois": nearby,
    }))
}

/// `POST /api/camera` -- run one vision pipeline cycle.
///
/// The pipeline fails closed internally, so this handler always succeeds;
/// a producer failure shows up as the safe-default payload in the reply.
pub async fn process_camera(
    State(state): State<Arc<AppState>>,
    Json(frame): Json<CameraFrame>,
) -> Json<serde_json::Value> {
    info!(description_len = frame.description.len(), "processing camera frame");
    let result = state.pipeline.process(&frame.description).await;

    Json(serde_json::json!({
        "status": "processed",
        "objective": result.objective,
        "danger_level": result.danger_level,
        "encounter_active": result.encounter_active,
    }))
}

/// `POST /api/objective` -- manual objective replacement.
pub async fn set_objective(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ObjectiveUpdate>,
) -> Json<serde_json::Value> {
    state.store.set_objective(update.text).await;
    Json(serde_json::json!({ "status": "objective_updated" }))
}

/// `POST /api/message` -- manual message push (last-write-wins).
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(update): Json<MessageUpdate>,
) -> Json<serde_json::Value> {
    state.store.set_message(update.text, update.timeout_ms).await;
    Json(serde_json::json!({ "status": "message_sent" }))
}

/// `POST /api/danger` -- danger/encounter triple from the vision bot.
///
/// Enforces the caller contract at the boundary: the store itself stays
/// permissive, but a payload naming a boss without an active encounter
/// (or vice versa) is rejected here before it can violate the snapshot
/// invariant.
pub async fn update_danger(
    State(state): State<Arc<AppState>>,
    Json(update): Json<DangerUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if update.encounter_name.is_some() != update.encounter_active {
        return Err(ApiError::Invalid(String::from(
            "encounter_name must be present exactly when encounter_active is true",
        )));
    }

    state
        .store
        .set_danger(
            update.danger_level,
            update.encounter_active,
            update.encounter_name,
        )
        .await;

    Ok(Json(serde_json::json!({ "status": "danger_updated" })))
}

/// `POST /api/reset` -- clear the observation history and rearm the
/// encounter edge detection (admin).
pub async fn reset_history(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.pipeline.reset().await;
    Json(serde_json::json!({ "status": "history_reset" }))
}
