//! Error types for the ticket triage service.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Knowledge-corpus and escalation-log errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Draft generation errors.
///
/// The shipped drafter is deterministic and infallible; this exists for the
/// trait seam so an LLM-backed drafter can surface provider failures.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Draft generation failed: {0}")]
    Generation(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
