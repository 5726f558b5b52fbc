//! Shared application state for the overlay API server.
//!
//! [`AppState`] bundles the world store, the vision pipeline, and the
//! broadcast channel that carries serialized world-state payloads to
//! every connected viewer.

use std::sync::Arc;

use sidequest_core::store::WorldStore;
use sidequest_vision::VisionPipeline;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for world-state payloads.
///
/// A viewer that falls behind by more than this many payloads receives a
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest state,
/// which is exactly the eventual-consistency contract of the stream.
pub const BROADCAST_CAPACITY: usize = 64;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// broadcast sender doubles as the subscriber registry: every live
/// `WebSocket` task holds a receiver, and `receiver_count` is the number
/// of live viewers.
#[derive(Clone)]
pub struct AppState {
    /// The shared world store.
    pub store: WorldStore,
    /// The vision observation pipeline.
    pub pipeline: Arc<VisionPipeline>,
    /// Broadcast sender for serialized world-state payloads.
    pub tx: broadcast::Sender<String>,
}

impl AppState {
    /// Create application state over the given store and pipeline.
    pub fn new(store: WorldStore, pipeline: Arc<VisionPipeline>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            store,
            pipeline,
            tx,
        }
    }

    /// Subscribe to the world-state stream.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Number of currently connected viewers.
    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
