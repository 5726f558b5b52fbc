//! Rolling window of recent observations.
//!
//! The window is the vision producer's short-term memory: the last few scene
//! descriptions are replayed into each prompt so the model can track changes
//! and escalations across frames. Fixed capacity, append-evict semantics,
//! never persisted.

use std::collections::VecDeque;

use sidequest_types::Observation;

/// Default number of observations retained.
pub const DEFAULT_CAPACITY: usize = 5;

/// A bounded, oldest-first sequence of the most recent observations.
///
/// Ring-buffer semantics: appending at capacity evicts the oldest entry.
/// The window carries no synchronization of its own; the pipeline guards it
/// with a single mutex, separate from the world store's lock.
#[derive(Debug, Clone)]
pub struct ObservationWindow {
    entries: VecDeque<Observation>,
    capacity: usize,
}

impl ObservationWindow {
    /// Create an empty window with the given capacity.
    ///
    /// A zero capacity is bumped to one so `push` always retains the
    /// latest observation.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Append an observation, evicting the oldest entry when full.
    pub fn push(&mut self, observation: Observation) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    /// Iterate the retained observations, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }

    /// Number of retained observations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window holds no observations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear all history (administrative reset).
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

impl Default for ObservationWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use sidequest_types::DangerLevel;

    use super::*;

    fn obs(description: &str) -> Observation {
        Observation::now(description, DangerLevel::None)
    }

    #[test]
    fn push_evicts_oldest_at_capacity() {
        let mut window = ObservationWindow::new(3);
        window.push(obs("one"));
        window.push(obs("two"));
        window.push(obs("three"));
        window.push(obs("four"));

        let descriptions: Vec<&str> =
            window.iter().map(|o| o.description.as_str()).collect();
        assert_eq!(descriptions, vec!["two", "three", "four"]);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn iteration_is_oldest_first() {
        let mut window = ObservationWindow::default();
        window.push(obs("first"));
        window.push(obs("second"));

        let first = window.iter().next().map(|o| o.description.clone());
        assert_eq!(first.as_deref(), Some("first"));
    }

    #[test]
    fn reset_clears_history() {
        let mut window = ObservationWindow::default();
        window.push(obs("anything"));
        assert!(!window.is_empty());

        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest() {
        let mut window = ObservationWindow::new(0);
        window.push(obs("only"));
        assert_eq!(window.len(), 1);
    }
}
