//! Data structures exchanged with extraction backends

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::downloader::progress::TransferProgress;

/// Metadata returned by a probe (`yt-dlp --dump-single-json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub extractor: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawEncoding>,
}

/// One encoding exactly as the backend reports it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEncoding {
    pub format_id: String,
    #[serde(default)]
    pub format_note: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
    #[serde(default)]
    pub abr: Option<f32>, // Audio bitrate
    #[serde(default)]
    pub vbr: Option<f32>, // Video bitrate
    #[serde(default)]
    pub protocol: Option<String>,
}

impl RawEncoding {
    /// yt-dlp spells a missing stream as the codec `"none"`; an absent
    /// field means "unknown" and is treated as present.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }
}

/// Audio post-processing applied after the transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    /// Target container/codec, e.g. `mp3`
    pub codec: String,
    /// yt-dlp `--audio-quality` value (`0` = best, `192K`, ...)
    pub quality: String,
}

/// A single transfer to perform
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// Encoding id or format selector passed to the backend
    pub format: String,
    pub output_dir: PathBuf,
    pub audio: Option<AudioExtraction>,
    pub progress: Option<mpsc::Sender<TransferProgress>>,
}

impl FetchRequest {
    pub fn new(url: &str, format: &str, output_dir: PathBuf) -> Self {
        Self {
            url: url.to_string(),
            format: format.to_string(),
            output_dir,
            audio: None,
            progress: None,
        }
    }

    pub fn with_audio(mut self, audio: AudioExtraction) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_progress(mut self, progress: Option<mpsc::Sender<TransferProgress>>) -> Self {
        self.progress = progress;
        self
    }
}

/// What the backend produced
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedMedia {
    pub local_path: PathBuf,
    pub title: String,
    /// Size as known to the backend, used when the file cannot be stat'ed
    pub reported_size: Option<u64>,
    /// Source audio bitrate in kbps, for audio extraction when known
    pub audio_bitrate_kbps: Option<f32>,
}
