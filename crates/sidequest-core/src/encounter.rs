//! Encounter state machine: edge detection and notification policy.
//!
//! The vision producer classifies each frame in isolation; this module owns
//! everything layered on top of that raw classification. It tracks the
//! previous cycle's encounter flag explicitly and reacts only to edges, so
//! a boss fight that stays active across many frames surfaces exactly one
//! "encounter started" notification and one "victory" notification, never a
//! flickering stream of both.
//!
//! Non-encounter notifications (discoveries, quest updates) are gated by the
//! producer's own judgment flag; the tracker never second-guesses those, it
//! only ranks them below encounter edges when both fire in the same cycle.

use sidequest_types::requests::DEFAULT_MESSAGE_TIMEOUT_MS;
use sidequest_types::{EncounterPhase, ObservationResult};
use tracing::info;

/// Display duration for an "encounter started" notification.
///
/// Longer than the ordinary 3000 ms so the start of a boss fight cannot be
/// missed.
pub const ENCOUNTER_START_TIMEOUT_MS: u64 = 5000;

/// A notification the tracker wants pushed to the overlay message slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The message text.
    pub text: String,
    /// Requested display duration in milliseconds.
    pub timeout_ms: u64,
}

/// Everything one observation cycle decided beyond the raw field updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// At most one notification per cycle; encounter edges outrank
    /// producer-gated notifications.
    pub notification: Option<Notification>,
    /// The objective to push, present only when it differs from the last
    /// pushed objective (suppresses redundant writes and log noise).
    pub objective: Option<String>,
    /// The phase after this cycle, for logging and status endpoints.
    pub phase: EncounterPhase,
}

/// Tracks encounter state across observation cycles.
///
/// Holds the explicit previous-state fields the edge comparison needs; it
/// deliberately does not infer edges from the danger level, which can stay
/// `High` after a boss is defeated or spike without a confrontation.
#[derive(Debug, Clone, Default)]
pub struct EncounterTracker {
    previous_active: bool,
    last_objective: Option<String>,
    phase: EncounterPhase,
}

impl EncounterTracker {
    /// Create a tracker in the calm state with no pushed objective.
    pub const fn new() -> Self {
        Self {
            previous_active: false,
            last_objective: None,
            phase: EncounterPhase::Calm,
        }
    }

    /// The phase after the most recent cycle.
    pub const fn phase(&self) -> EncounterPhase {
        self.phase
    }

    /// Run one cycle against a sanitized producer result.
    ///
    /// Compares the result's `encounter_active` to the previous cycle's
    /// value:
    ///
    /// - false to true: rising edge, "encounter started" notification with
    ///   the boss name and the long display duration
    /// - true to false: falling edge, "victory" notification with the
    ///   default duration
    /// - unchanged: no transition notification; the producer's own
    ///   notification gate may still surface one
    pub fn observe(&mut self, result: &ObservationResult) -> CycleOutcome {
        let notification = self.transition_notification(result).or_else(|| {
            // The producer's judgment call, intentionally more permissive.
            (result.show_notification && !result.message_text.is_empty()).then(|| Notification {
                text: result.message_text.clone(),
                timeout_ms: DEFAULT_MESSAGE_TIMEOUT_MS,
            })
        });

        let objective = (!result.objective.is_empty()
            && self.last_objective.as_deref() != Some(result.objective.as_str()))
        .then(|| {
            self.last_objective = Some(result.objective.clone());
            result.objective.clone()
        });

        self.previous_active = result.encounter_active;
        self.phase = EncounterPhase::derive(result.danger_level, result.encounter_active);

        CycleOutcome {
            notification,
            objective,
            phase: self.phase,
        }
    }

    /// Forget all tracked state (administrative reset).
    ///
    /// After a reset the next active observation is treated as a fresh
    /// rising edge.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The edge-triggered transition notification, if this cycle is an edge.
    fn transition_notification(&self, result: &ObservationResult) -> Option<Notification> {
        match (self.previous_active, result.encounter_active) {
            (false, true) => {
                let name = result.encounter_name.as_deref().unwrap_or("Unknown Enemy");
                info!(boss = name, "encounter started");
                Some(Notification {
                    text: format!("⚔ BOSS ENCOUNTER: {name}"),
                    timeout_ms: ENCOUNTER_START_TIMEOUT_MS,
                })
            }
            (true, false) => {
                info!("encounter ended");
                Some(Notification {
                    text: String::from("Victory! Enemy Defeated!"),
                    timeout_ms: DEFAULT_MESSAGE_TIMEOUT_MS,
                })
            }
            _ => None,
        }
    }
}
