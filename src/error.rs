//! Error types for katha.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KathaError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio decoding errors — the only failure that aborts a run
    #[error("Failed to decode audio from {path}: {message}")]
    Decode { path: String, message: String },

    // Chunking errors
    #[error("Invalid chunking parameters: {message}")]
    Chunking { message: String },

    // Transcript persistence — non-fatal, reported alongside the transcript
    #[error("Failed to persist transcript to {path}: {message}")]
    Persist { path: String, message: String },

    // Service boundary errors
    #[error("Service socket error: {message}")]
    ServiceSocket { message: String },

    #[error("Service protocol error: {message}")]
    ServiceProtocol { message: String },

    // Dataset mirror errors
    #[error("Dataset fetch failed: {message}")]
    DatasetFetch { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, KathaError>;
