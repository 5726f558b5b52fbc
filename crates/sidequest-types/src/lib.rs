//! Shared type definitions for the SideQuest overlay backend.
//!
//! This crate is the single source of truth for every type that crosses a
//! crate boundary in the SideQuest workspace. Wire-facing types flow
//! downstream to `TypeScript` via `ts-rs` for the overlay frontend.
//!
//! # Modules
//!
//! - [`enums`] -- Danger levels and encounter phases
//! - [`structs`] -- World state, observations, and producer results
//! - [`requests`] -- Inbound mutation request payloads

pub mod enums;
pub mod requests;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DangerLevel, EncounterPhase};
pub use requests::{
    CameraFrame, DangerUpdate, LocationUpdate, MessageUpdate, ObjectiveUpdate,
};
pub use structs::{Observation, ObservationResult, OverlayMessage, Player, Poi, WorldState};
