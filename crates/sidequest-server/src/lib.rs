//! HTTP + `WebSocket` API server for the SideQuest overlay backend.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) streaming the full world state to
//!   every viewer at the broadcast cadence via [`tokio::sync::broadcast`]
//! - **Mutation REST endpoints** for the GPS producer, the vision
//!   pipeline, and manual operator tools
//! - **Snapshot query** (`GET /api/state`) returning the current world
//!   state as one document
//!
//! # Architecture
//!
//! The broadcaster task ticks at a fixed period (default 100 ms, 10 Hz),
//! takes one snapshot, serializes it once, and fans the identical payload
//! out through a broadcast channel. Each `WebSocket` connection holds a
//! receiver; dropping the connection deregisters it, so a dead viewer is
//! gone by the next tick and cannot disturb the others. Ticks with no
//! viewers skip the snapshot and serialization entirely.

pub mod broadcast;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use broadcast::run_broadcaster;
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
