//! Capture configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::template::DEFAULT_TITLE;
use crate::error::ConfigError;

/// Default directory documents are written to
pub const DEFAULT_OUTPUT_DIR: &str = "logs";

/// Default wait for a previous turn's stream before flushing it partially
pub const DEFAULT_STREAM_FLUSH_TIMEOUT_MS: u64 = 30_000;

/// Settings for a capture session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Directory for `<id>.html` documents
    pub output_dir: PathBuf,
    /// How long the next request waits for a still-running stream aggregation
    pub stream_flush_timeout_ms: u64,
    /// Page title of every document
    pub title: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            stream_flush_timeout_ms: DEFAULT_STREAM_FLUSH_TIMEOUT_MS,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl CaptureConfig {
    pub fn stream_flush_timeout(&self) -> Duration {
        Duration::from_millis(self.stream_flush_timeout_ms)
    }

    /// Load from a TOML file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("logs"));
        assert_eq!(config.stream_flush_timeout(), Duration::from_secs(30));
        assert_eq!(config.title, "AI Conversation");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CaptureConfig::parse("output_dir = \"/tmp/chats\"").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/chats"));
        assert_eq!(config.stream_flush_timeout_ms, DEFAULT_STREAM_FLUSH_TIMEOUT_MS);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = CaptureConfig::parse("stream_flush_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "title = \"Agent run\"\nstream_flush_timeout_ms = 500").unwrap();

        let config = CaptureConfig::load(file.path()).unwrap();
        assert_eq!(config.title, "Agent run");
        assert_eq!(config.stream_flush_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CaptureConfig::load(Path::new("/nonexistent/chatscribe.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
