//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/vidscout/` | `~/.config/vidscout/` |
//! | Data (logs) | `~/Library/Application Support/vidscout/` | `~/.local/share/vidscout/` |
//!
//! # Environment Overrides
//!
//! - `VIDSCOUT_CONFIG_DIR` overrides [`config_dir`]
//! - `VIDSCOUT_DATA_DIR` overrides [`data_dir`]

use std::path::PathBuf;

const APP_DIR: &str = "vidscout";

/// Application config directory.
///
/// Holds `config.toml` and, by convention, the `keys.txt` key set.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("VIDSCOUT_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| std::env::temp_dir().join("vidscout-config"))
}

/// Application data root directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("VIDSCOUT_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| std::env::temp_dir().join("vidscout-data"))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Default configuration file (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default key set file (`config_dir()/keys.txt`).
#[must_use]
pub fn keys_file() -> PathBuf {
    config_dir().join("keys.txt")
}
