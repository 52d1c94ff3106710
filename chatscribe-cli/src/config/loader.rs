use super::types::{
    ChatscribeConfig, DEFAULT_API_KEY_ENV, DEFAULT_MODEL, ProviderConfig, RawCaptureConfig,
    RawChatscribeConfig, RawProviderConfig,
};
use anyhow::Result;
use chatscribe_core::CaptureConfig;
use chatscribe_core::config::{DEFAULT_OUTPUT_DIR, DEFAULT_STREAM_FLUSH_TIMEOUT_MS};
use chatscribe_core::document::template::DEFAULT_TITLE;
use chatscribe_models::providers::DEFAULT_BASE_URL;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the project config directory (useful for isolated tests)
const PROJECT_DIR_ENV: &str = "CHATSCRIBE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<ChatscribeConfig> {
        let mut raw = RawChatscribeConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Load a single config file, falling back to defaults when it is missing
    pub fn load_from_path(path: &Path) -> Result<ChatscribeConfig> {
        if !path.exists() {
            return Ok(ChatscribeConfig::default());
        }
        Ok(Self::finalize(Self::read_raw(path)?))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/chatscribe/config.toml`)
    pub fn user_config_path() -> PathBuf {
        chatscribe_paths::config_file()
    }

    /// Get project config path
    /// Can be overridden with CHATSCRIBE_PROJECT_CONFIG_DIR
    pub fn project_config_path() -> PathBuf {
        match std::env::var(PROJECT_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir).join(chatscribe_paths::CONFIG_FILE),
            Err(_) => PathBuf::from(".chatscribe").join(chatscribe_paths::CONFIG_FILE),
        }
    }

    fn read_raw(path: &Path) -> Result<RawChatscribeConfig> {
        debug!("Reading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawChatscribeConfig, overlay: RawChatscribeConfig) -> RawChatscribeConfig {
        RawChatscribeConfig {
            capture: RawCaptureConfig {
                output_dir: overlay.capture.output_dir.or(base.capture.output_dir),
                stream_flush_timeout_ms: overlay
                    .capture
                    .stream_flush_timeout_ms
                    .or(base.capture.stream_flush_timeout_ms),
                title: overlay.capture.title.or(base.capture.title),
            },
            provider: RawProviderConfig {
                base_url: overlay.provider.base_url.or(base.provider.base_url),
                model: overlay.provider.model.or(base.provider.model),
                api_key_env: overlay.provider.api_key_env.or(base.provider.api_key_env),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawChatscribeConfig) -> ChatscribeConfig {
        ChatscribeConfig {
            capture: CaptureConfig {
                output_dir: raw
                    .capture
                    .output_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
                stream_flush_timeout_ms: raw
                    .capture
                    .stream_flush_timeout_ms
                    .unwrap_or(DEFAULT_STREAM_FLUSH_TIMEOUT_MS),
                title: raw
                    .capture
                    .title
                    .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            },
            provider: ProviderConfig {
                base_url: raw
                    .provider
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: raw
                    .provider
                    .model
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_key_env: raw
                    .provider
                    .api_key_env
                    .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            },
        }
    }
}
