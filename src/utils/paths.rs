//! Platform directories for downloads and configuration

use std::path::PathBuf;

const APP_DIR: &str = "medialoader";

/// `~/Downloads/medialoader` on all platforms
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(APP_DIR)
}

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/medialoader
/// - Windows: %APPDATA%\medialoader
/// - Linux: ~/.config/medialoader
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}
