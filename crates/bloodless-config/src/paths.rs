//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/bloodless/`
//! - macOS: `~/Library/Application Support/bloodless/`
//! - Windows: `%APPDATA%\bloodless\`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "bloodless";

/// File name of the processor settings.
pub const SETTINGS_FILE: &str = "settings.toml";

/// File name of the last saved parameter state.
pub const STATE_FILE: &str = "state.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the user settings file.
pub fn user_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Path of the user parameter state file.
pub fn user_state_path() -> PathBuf {
    user_config_dir().join(STATE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_config_dir() {
        let dir = user_config_dir();
        assert!(dir.ends_with(APP_NAME));
        assert_eq!(user_settings_path(), dir.join("settings.toml"));
        assert_eq!(user_state_path(), dir.join("state.toml"));
    }
}
