use chatscribe_core::CaptureConfig;
use chatscribe_models::providers::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default model for `chatscribe chat`
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Environment variable holding the API key unless configured otherwise
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawChatscribeConfig {
    #[serde(default)]
    pub capture: RawCaptureConfig,

    #[serde(default)]
    pub provider: RawProviderConfig,
}

/// Capture config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCaptureConfig {
    /// Directory transcripts are written to
    pub output_dir: Option<PathBuf>,

    /// Wait for an unfinished stream before flushing it partially
    pub stream_flush_timeout_ms: Option<u64>,

    /// Page title of each transcript
    pub title: Option<String>,
}

/// Provider config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawProviderConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatscribeConfig {
    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Model used when `--model` is not given
    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}
