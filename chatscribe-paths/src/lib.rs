//! XDG Base Directory paths for chatscribe.
//!
//! The CLI resolves XDG paths on every platform rather than platform-native
//! ones, so a config written on Linux works unchanged on macOS.

use std::path::PathBuf;

/// Directory name under the XDG base directories.
const APP_NAME: &str = "chatscribe";

/// File name of the user config inside [`config_dir`].
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve `$<var>/chatscribe`, falling back to `~/<home_relative>/chatscribe`.
fn xdg_dir(var: &str, home_relative: &str) -> PathBuf {
    if let Ok(base) = std::env::var(var)
        && !base.is_empty()
    {
        return PathBuf::from(base).join(APP_NAME);
    }
    match dirs::home_dir() {
        Some(home) => home.join(home_relative).join(APP_NAME),
        None => PathBuf::from(home_relative).join(APP_NAME),
    }
}

/// Get the chatscribe config directory.
///
/// Returns `$XDG_CONFIG_HOME/chatscribe` if set, otherwise
/// `~/.config/chatscribe`.
///
/// # Examples
///
/// ```
/// use chatscribe_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("chatscribe"));
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Path of the user config file.
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Get the chatscribe data directory.
///
/// Returns `$XDG_DATA_HOME/chatscribe` if set, otherwise
/// `~/.local/share/chatscribe`. Exported transcripts default to a
/// `transcripts` directory below it.
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

/// Default directory for transcripts written by `chatscribe export`.
pub fn transcripts_dir() -> PathBuf {
    data_dir().join("transcripts")
}
