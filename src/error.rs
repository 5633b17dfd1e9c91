//! Error types for the banking agent router

use crate::models::Label;
use thiserror::Error;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

#[derive(Error, Debug)]
pub enum OrchestrationError {

    // =============================
    // Dispatch Table Invariants
    // =============================

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No specialist registered for label {0}")]
    UnroutableLabel(Label),

    // =============================
    // Text Generation
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("LLM call timed out after {0} ms")]
    LlmTimeout(u64),

    // =============================
    // Startup
    // =============================

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OrchestrationError {
    /// Whether this error means the process was wired up incorrectly,
    /// as opposed to a recoverable runtime failure.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            OrchestrationError::Configuration(_)
                | OrchestrationError::UnroutableLabel(_)
                | OrchestrationError::InvalidConfig { .. }
        )
    }
}
