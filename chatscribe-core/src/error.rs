//! Error types for chatscribe-core
//!
//! None of these ever reach the caller of a wrapped chat client: capture is
//! fail-open, so every error below is logged and absorbed at the capture
//! boundary.

use thiserror::Error;

/// Top-level error type for the capture pipeline
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure rendering one content part or one message
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unsupported image URL: {0}")]
    UnsupportedImageUrl(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the document lifecycle
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document {0} is closed")]
    Closed(String),
}

/// Errors from the persistence collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write document {id}: {source}")]
    Write {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors loading capture configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
