//! Inbound mutation request payloads.
//!
//! Every producer (phone GPS, vision bot, manual operator tools) talks to
//! the backend through one of these fire-and-forget requests. They return
//! an acknowledgement, never a derived value.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DangerLevel;

/// Default display duration for a manually sent message, in milliseconds.
pub const DEFAULT_MESSAGE_TIMEOUT_MS: u64 = 3000;

/// Position update from the phone GPS producer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationUpdate {
    /// New latitude in decimal degrees.
    pub lat: f64,
    /// New longitude in decimal degrees.
    pub lon: f64,
    /// New heading in degrees; when omitted the heading is unchanged.
    #[serde(default)]
    pub heading: Option<f64>,
}

/// A camera scene description submitted to the vision pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CameraFrame {
    /// Free-text description of what the camera sees.
    pub description: String,
    /// Optional capture timestamp (Unix milliseconds), advisory only.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Manual objective replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ObjectiveUpdate {
    /// The new objective text; empty string is accepted.
    pub text: String,
}

/// Manual message push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MessageUpdate {
    /// The message text.
    pub text: String,
    /// Requested display duration in milliseconds.
    #[serde(default = "default_message_timeout")]
    pub timeout_ms: u64,
}

/// Danger and encounter state update from the vision bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DangerUpdate {
    /// The new danger classification.
    pub danger_level: DangerLevel,
    /// Whether a boss encounter is active.
    pub encounter_active: bool,
    /// Boss name; must be null unless `encounter_active` is true.
    #[serde(default)]
    pub encounter_name: Option<String>,
}

const fn default_message_timeout() -> u64 {
    DEFAULT_MESSAGE_TIMEOUT_MS
}
