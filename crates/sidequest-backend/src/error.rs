//! Error type for backend startup and wiring.

use sidequest_core::ConfigError;
use sidequest_server::ServerError;
use sidequest_vision::VisionError;

/// Errors that can occur while starting the overlay backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The vision producer could not be set up.
    #[error("vision setup error: {0}")]
    Vision(#[from] VisionError),

    /// The HTTP server failed to start or crashed.
    #[error("server error: {0}")]
    Server(#[from] ServerError),
}
