//! Error types for scenegen
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in scenegen
#[derive(Debug, Error)]
pub enum ScenegenError {
    /// A generative stage (planner, synthesizer, corrector) returned invalid
    /// or unusable output
    #[error("Generation failed: {0}")]
    Generation(String),

    /// LLM API transport error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The render subprocess could not be started or managed
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid state transition or operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The request was cancelled before the next stage started
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for scenegen operations
pub type Result<T> = std::result::Result<T, ScenegenError>;
