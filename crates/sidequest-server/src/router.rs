//! Axum router construction for the overlay API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled; the overlay frontend is served from a
//! different origin (and through tunnels during mobile testing), so any
//! origin is allowed.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the overlay server.
///
/// The router includes:
/// - `GET /` -- status document
/// - `GET /ws` -- `WebSocket` world-state stream
/// - `GET /api/state` -- current snapshot
/// - `POST /update` -- full state replacement
/// - `POST /api/location` -- GPS position update
/// - `POST /api/camera` -- vision pipeline entry
/// - `POST /api/objective`, `/api/message`, `/api/danger` -- manual tools
/// - `POST /api/reset` -- observation history reset
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_state))
        // REST API
        .route("/api/state", get(handlers::get_state))
        .route("/update", post(handlers::update_state))
        .route("/api/location", post(handlers::update_location))
        .route("/api/camera", post(handlers::process_camera))
        .route("/api/objective", post(handlers::set_objective))
        .route("/api/message", post(handlers::send_message))
        .route("/api/danger", post(handlers::update_danger))
        .route("/api/reset", post(handlers::reset_history))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
