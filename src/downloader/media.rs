//! Result types produced by the orchestrator

use crate::format::descriptor::FormatCatalog;
use crate::utils::error::MediaError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Number of combined encodings listed in a [`MediaInfo`] summary
const SUMMARY_VIDEO_ROWS: usize = 5;
/// Number of audio encodings listed in a [`MediaInfo`] summary
const SUMMARY_AUDIO_ROWS: usize = 3;

/// A completed download. The caller owns the file from here on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedMedia {
    pub file_path: PathBuf,
    pub file_name: String,
    pub title: String,
    pub size_bytes: u64,
    /// Rounded to one decimal
    pub size_mb: f64,
    /// Label of the encoding actually transferred
    pub quality_label: String,
    pub encoding_id: String,
}

pub type DownloadResult = Result<DownloadedMedia, MediaError>;

/// Metadata and catalog from a single probe
#[derive(Debug, Clone, Serialize)]
pub struct MediaInfo {
    pub title: String,
    pub uploader: Option<String>,
    pub duration_secs: Option<f64>,
    pub view_count: Option<u64>,
    pub upload_date: Option<String>,
    pub webpage_url: Option<String>,
    pub extractor: Option<String>,
    pub platform: &'static str,
    pub catalog: FormatCatalog,
}

impl fmt::Display for MediaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "Platform: {}", self.platform)?;
        if let Some(uploader) = &self.uploader {
            writeln!(f, "Uploader: {}", uploader)?;
        }
        if let Some(secs) = self.duration_secs {
            writeln!(f, "Duration: {}", format_duration(secs))?;
        }
        if let Some(views) = self.view_count {
            writeln!(f, "Views: {}", views)?;
        }

        if !self.catalog.combined().is_empty() {
            writeln!(f, "Video:")?;
            for d in self.catalog.combined().iter().take(SUMMARY_VIDEO_ROWS) {
                writeln!(f, "  [{}] {}", d.id, d)?;
            }
        }
        if !self.catalog.audio_only().is_empty() {
            writeln!(f, "Audio:")?;
            for d in self.catalog.audio_only().iter().take(SUMMARY_AUDIO_ROWS) {
                writeln!(f, "  [{}] {}", d.id, d)?;
            }
        }
        Ok(())
    }
}

/// 3725.0 -> "1:02:05", 180.0 -> "3:00"
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
