//! Error types for chat-completion clients.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a chat-completion API.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider API error.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// Request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// A streaming response failed part way through.
    #[error("stream error: {0}")]
    Stream(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
