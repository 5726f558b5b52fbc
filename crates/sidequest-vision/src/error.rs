//! Error types for the vision producer.
//!
//! Uses `thiserror` for typed errors surfacing through the pipeline:
//! template rendering, LLM calls, response parsing. Note that the pipeline
//! itself never propagates these to its caller; it fails closed to a safe
//! default payload and logs instead.

/// Errors that can occur inside the vision producer.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// Failed to render a prompt template.
    #[error("template render error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The LLM response could not be parsed into an observation result.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),
}
