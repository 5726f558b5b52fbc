//! Real-time state synchronization core for the SideQuest overlay backend.
//!
//! This crate owns the single shared world state and the logic around it:
//!
//! - [`store`] -- the exclusively-owned [`WorldStore`](store::WorldStore)
//!   with its narrow, atomic mutation API
//! - [`gazetteer`] -- the static points-of-interest table and the
//!   great-circle distance filter
//! - [`window`] -- the fixed-capacity rolling window of recent observations
//! - [`encounter`] -- the encounter state machine with edge-triggered
//!   notification policy
//! - [`config`] -- typed YAML configuration for the whole backend
//!
//! The [`WorldStore`](store::WorldStore) and the
//! [`ObservationWindow`](window::ObservationWindow) each carry their own
//! exclusive-access discipline and are never locked together; no operation
//! needs a cross-resource transaction.

pub mod config;
pub mod encounter;
pub mod gazetteer;
pub mod store;
pub mod window;

// Re-export primary types for convenience.
pub use config::{BackendConfig, ConfigError};
pub use encounter::{EncounterTracker, Notification};
pub use gazetteer::Gazetteer;
pub use store::WorldStore;
pub use window::ObservationWindow;
