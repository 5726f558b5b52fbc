//! Core entity structs for the SideQuest overlay.
//!
//! [`WorldState`] is the document every viewer receives per broadcast tick,
//! so its shape is the wire contract with the overlay frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DangerLevel;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The player's real-world position and facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Heading in degrees from north, 0-360, wrapping.
    pub heading: f64,
}

// ---------------------------------------------------------------------------
// Point of interest
// ---------------------------------------------------------------------------

/// A fixed point of interest near the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Poi {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Human-readable label shown on the overlay.
    pub label: String,
}

// ---------------------------------------------------------------------------
// Overlay message
// ---------------------------------------------------------------------------

/// A transient notification shown on the overlay.
///
/// The backend records the requested display duration but does not enforce
/// it; the viewer hides the message after `timeout_ms` elapses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OverlayMessage {
    /// The message text.
    pub text: String,
    /// Whether the viewer should currently show the message.
    pub visible: bool,
    /// Requested display duration in milliseconds.
    pub timeout_ms: u64,
}

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

/// The complete shared world state streamed to every viewer.
///
/// Invariant: `encounter_name` is `Some` if and only if `encounter_active`
/// is `true`, in every observable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldState {
    /// The player's position and heading.
    pub player: Player,
    /// Points of interest within the configured radius of the player.
    ///
    /// Derived state: recomputed whenever the player moves, never mutated
    /// independently.
    pub pois: Vec<Poi>,
    /// The current quest objective, replaced wholesale.
    pub objective: String,
    /// The current transient message (last-write-wins, no queueing).
    pub message: OverlayMessage,
    /// Current danger classification.
    pub danger_level: DangerLevel,
    /// Whether a boss encounter is active.
    pub encounter_active: bool,
    /// The boss name, present exactly while an encounter is active.
    pub encounter_name: Option<String>,
    /// Short advisory description of the current environment.
    pub environment: String,
}

impl WorldState {
    /// Create the initial world state at the given position.
    ///
    /// POIs start empty; the store populates them from the gazetteer as
    /// soon as it is seeded with a position.
    pub fn initial(lat: f64, lon: f64) -> Self {
        Self {
            player: Player {
                lat,
                lon,
                heading: 0.0,
            },
            pois: Vec::new(),
            objective: String::from("Begin your adventure"),
            message: OverlayMessage::default(),
            danger_level: DangerLevel::None,
            encounter_active: false,
            encounter_name: None,
            environment: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// One unit of sensed information about the real-world scene.
///
/// Observations feed the rolling context window that gives the vision
/// producer continuity across calls. They are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// When the observation was made.
    pub timestamp: DateTime<Utc>,
    /// Free-text description of the scene.
    pub description: String,
    /// The danger signal derived from this observation.
    pub danger_level: DangerLevel,
}

impl Observation {
    /// Create an observation timestamped now.
    pub fn now(description: impl Into<String>, danger_level: DangerLevel) -> Self {
        Self {
            timestamp: Utc::now(),
            description: description.into(),
            danger_level,
        }
    }
}

// ---------------------------------------------------------------------------
// Observation result
// ---------------------------------------------------------------------------

/// The structured output of one vision producer cycle.
///
/// This is the producer's judgment of the scene: the quest objective, the
/// danger classification, the encounter decision, and optionally a
/// notification. The encounter edge detection layered on top of this raw
/// classification belongs to the encounter tracker, not the producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationResult {
    /// Quest-style objective text for the current scene.
    #[serde(default)]
    pub objective: String,
    /// Notification text, empty when nothing is worth surfacing.
    #[serde(default)]
    pub message_text: String,
    /// Whether the producer wants the notification shown.
    #[serde(default)]
    pub message_visible: bool,
    /// Producer-controlled gate for non-encounter notifications.
    ///
    /// Deliberately more permissive than the encounter edges: the producer
    /// decides when a discovery or quest update deserves a popup.
    #[serde(default)]
    pub show_notification: bool,
    /// Danger classification for this cycle.
    #[serde(default)]
    pub danger_level: DangerLevel,
    /// Whether the producer considers a boss encounter active.
    #[serde(default)]
    pub encounter_active: bool,
    /// Boss name, expected only when `encounter_active` is true.
    #[serde(default)]
    pub encounter_name: Option<String>,
    /// Brief description of the environment.
    #[serde(default)]
    pub environment_summary: String,
}

impl ObservationResult {
    /// The known-safe payload used when the producer fails.
    ///
    /// Danger none, no encounter, no message: the pipeline fails closed to
    /// this rather than propagating an undefined danger level.
    pub fn safe_default() -> Self {
        Self {
            objective: String::from("Continue your journey"),
            environment_summary: String::from("unknown"),
            ..Self::default()
        }
    }

    /// Enforce the encounter-name invariant on a raw producer payload.
    ///
    /// Clears `encounter_name` when no encounter is active, so a sloppy
    /// producer can never make the store violate the name-iff-active
    /// invariant.
    pub fn sanitize(mut self) -> Self {
        if !self.encounter_active {
            self.encounter_name = None;
        } else if self
            .encounter_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty())
        {
            // An active encounter always carries a printable name.
            self.encounter_name = Some(String::from("Unknown Enemy"));
        }
        self
    }
}
