//! Enumeration types for the SideQuest overlay.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Danger level
// ---------------------------------------------------------------------------

/// Severity of the current real-world scene, as classified by the vision
/// producer.
///
/// The variants are totally ordered by severity (`None < Low < High`) so
/// hysteresis logic can compare levels directly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum DangerLevel {
    /// Normal, calm, safe situation.
    #[default]
    None,
    /// Tense or suspicious, but not an immediate threat.
    Low,
    /// Aggressive behavior, hostile approach, immediate danger.
    High,
}

// ---------------------------------------------------------------------------
// Encounter phase
// ---------------------------------------------------------------------------

/// The encounter state machine's current phase.
///
/// Derived from the danger level and the encounter-active flag; exposed for
/// observability, never used as the edge signal itself (the tracked
/// encounter-active boolean is canonical).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum EncounterPhase {
    /// No danger, no active encounter.
    #[default]
    Calm,
    /// Low danger, no active encounter.
    Tense,
    /// High danger with an active, named encounter.
    Encounter,
}

impl EncounterPhase {
    /// Derive the phase from the danger level and the encounter flag.
    ///
    /// An active encounter always wins regardless of the reported danger
    /// level; otherwise `Low` or `High` danger without an encounter is
    /// merely tense.
    pub const fn derive(danger_level: DangerLevel, encounter_active: bool) -> Self {
        if encounter_active {
            Self::Encounter
        } else {
            match danger_level {
                DangerLevel::None => Self::Calm,
                DangerLevel::Low | DangerLevel::High => Self::Tense,
            }
        }
    }
}
