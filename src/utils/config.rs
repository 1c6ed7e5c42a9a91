//! Application configuration

use crate::format::request::{AudioTier, QualityRequest};
use crate::utils::error::MediaError;
use crate::utils::paths::default_download_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application settings
///
/// Every field has a default, so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Download location
    pub download_location: PathBuf,

    /// Quality used when a caller does not ask for one
    pub default_quality: QualityRequest,

    pub default_audio_tier: AudioTier,

    /// Explicit yt-dlp executable; searched for when unset
    pub ytdlp_path: Option<PathBuf>,

    /// yt-dlp output template, relative to the output directory
    pub output_template: String,

    /// Upper bound for one metadata probe
    pub probe_timeout_secs: u64,

    /// Upper bound for one transfer
    pub transfer_timeout_secs: u64,

    /// Maximum concurrent downloads in a batch
    pub max_concurrent: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_location: default_download_dir(),
            default_quality: QualityRequest::Best,
            default_audio_tier: AudioTier::Best,
            ytdlp_path: None,
            output_template: "%(title)s.%(ext)s".to_string(),
            probe_timeout_secs: 120,
            transfer_timeout_secs: 1800,
            max_concurrent: 5,
        }
    }
}

impl AppSettings {
    /// Read settings from a JSON file, using defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, MediaError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), MediaError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), MediaError> {
        if self.max_concurrent == 0 {
            return Err(MediaError::InvalidConfig(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.probe_timeout_secs == 0 || self.transfer_timeout_secs == 0 {
            return Err(MediaError::InvalidConfig(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.output_template.trim().is_empty() {
            return Err(MediaError::InvalidConfig(
                "output_template must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
