//! The observation pipeline: description in, committed world state out.
//!
//! One cycle per camera frame:
//!
//! 1. Render the prompt from the rolling window (window mutex held only
//!    for the read, then released)
//! 2. Call the LLM backend with an overall deadline -- no lock of any kind
//!    is held while the call is in flight
//! 3. Parse the response, failing closed to the safe default payload
//! 4. Commit: append the observation to the window, run the encounter
//!    tracker, and apply the result to the world store
//!
//! A producer failure is isolated to its own cycle: the caller gets the
//! safe-default outcome and the loop continues. The pipeline never returns
//! an error for a producer problem.

use std::time::Duration;

use sidequest_core::encounter::EncounterTracker;
use sidequest_core::store::WorldStore;
use sidequest_core::window::ObservationWindow;
use sidequest_types::{Observation, ObservationResult};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::llm::LlmBackend;
use crate::parse::parse_observation;
use crate::prompt::PromptEngine;

/// The vision observation pipeline.
///
/// Owns the rolling window and the encounter tracker behind their own
/// mutexes, and a handle to the shared world store. Neither mutex is ever
/// held across the LLM call or together with the store's lock.
pub struct VisionPipeline {
    store: WorldStore,
    backend: LlmBackend,
    prompt_engine: PromptEngine,
    window: Mutex<ObservationWindow>,
    tracker: Mutex<EncounterTracker>,
    request_timeout: Duration,
}

impl VisionPipeline {
    /// Create a pipeline over the given store, backend, and window capacity.
    pub fn new(
        store: WorldStore,
        backend: LlmBackend,
        prompt_engine: PromptEngine,
        history_size: usize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            backend,
            prompt_engine,
            window: Mutex::new(ObservationWindow::new(history_size)),
            tracker: Mutex::new(EncounterTracker::new()),
            request_timeout,
        }
    }

    /// Process one camera frame description and commit the outcome.
    ///
    /// Always succeeds from the caller's perspective; on producer failure
    /// the committed payload is [`ObservationResult::safe_default`].
    pub async fn process(&self, description: &str) -> ObservationResult {
        // Read the history context and release the window lock before any
        // slow work.
        let prompt = {
            let window = self.window.lock().await;
            let history: Vec<&Observation> = window.iter().collect();
            self.prompt_engine.render(&history, description)
        };

        let result = match prompt {
            Ok(prompt) => self.classify(&prompt).await,
            Err(e) => {
                warn!(error = %e, "prompt render failed, using safe default");
                ObservationResult::safe_default()
            }
        };

        self.commit(description, &result).await;
        result
    }

    /// Clear the rolling window and rearm the encounter tracker.
    ///
    /// Administrative operation; after a reset the producer starts with no
    /// history and the next active encounter is a fresh rising edge.
    pub async fn reset(&self) {
        self.window.lock().await.reset();
        self.tracker.lock().await.reset();
        info!("observation history and encounter state reset");
    }

    /// Call the LLM with the overall deadline and parse its answer.
    async fn classify(&self, prompt: &crate::prompt::RenderedPrompt) -> ObservationResult {
        match timeout(self.request_timeout, self.backend.complete(prompt)).await {
            Ok(Ok(raw)) => parse_observation(&raw),
            Ok(Err(e)) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    "vision backend call failed, using safe default"
                );
                ObservationResult::safe_default()
            }
            Err(_) => {
                warn!(
                    backend = self.backend.name(),
                    timeout_ms = %self.request_timeout.as_millis(),
                    "vision backend call timed out, using safe default"
                );
                ObservationResult::safe_default()
            }
        }
    }

    /// Commit one cycle: window append, tracker edges, store writes.
    async fn commit(&self, description: &str, result: &ObservationResult) {
        {
            let mut window = self.window.lock().await;
            window.push(Observation::now(description, result.danger_level));
        }

        let outcome = {
            let mut tracker = self.tracker.lock().await;
            tracker.observe(result)
        };

        // Composite field update; the message slot only changes when the
        // producer marked it visible.
        self.store.apply_observation(result).await;

        // Transition and producer-gated notifications overwrite the message
        // slot last so an encounter edge always wins the cycle.
        if let Some(notification) = &outcome.notification {
            self.store
                .set_message(notification.text.clone(), notification.timeout_ms)
                .await;
        }

        if let Some(objective) = &outcome.objective {
            info!(objective, phase = ?outcome.phase, "objective updated");
        } else {
            debug!(phase = ?outcome.phase, "cycle committed, objective unchanged");
        }
    }
}
