//! Vision observation producer for the SideQuest overlay backend.
//!
//! Turns free-text camera scene descriptions into structured
//! [`ObservationResult`](sidequest_types::ObservationResult)s via an LLM,
//! and commits them to the world store through the encounter state machine.
//!
//! # Modules
//!
//! - [`llm`] -- enum-dispatched LLM backends (`OpenAI`-compatible, Anthropic)
//! - [`prompt`] -- `minijinja` prompt templates with rolling history context
//! - [`parse`] -- tolerant JSON response parsing with fail-closed defaults
//! - [`pipeline`] -- the full observation cycle, lock-free across the LLM call
//! - [`error`] -- typed errors for the whole crate
//!
//! The pipeline guarantees that no world-store or window lock is ever held
//! while the (seconds-scale) LLM call is in flight, so a slow producer can
//! never stall the broadcaster or other mutators.

pub mod error;
pub mod llm;
pub mod parse;
pub mod pipeline;
pub mod prompt;

// Re-export primary types for convenience.
pub use error::VisionError;
pub use llm::{create_backend, BackendType, LlmBackend, LlmBackendConfig};
pub use parse::parse_observation;
pub use pipeline::VisionPipeline;
pub use prompt::{PromptEngine, RenderedPrompt};
