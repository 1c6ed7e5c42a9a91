//! Encoding descriptors and the per-URL format catalog

use crate::extractor::models::RawEncoding;
use crate::format::scorer::score_descriptor;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// One concrete downloadable stream variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingDescriptor {
    /// Backend-assigned id, stable within one resolution
    pub id: String,
    pub quality_label: String,
    /// "WxH" when known
    pub resolution: Option<String>,
    pub extension: String,
    pub has_video: bool,
    pub has_audio: bool,
    pub size_bytes: Option<u64>,
    pub audio_bitrate_kbps: Option<f32>,
    pub fps: Option<f32>,
    pub protocol: Option<String>,
}

impl EncodingDescriptor {
    /// Convert a backend encoding. Returns `None` for entries that carry
    /// neither audio nor video (storyboards and the like).
    pub fn from_raw(raw: &RawEncoding) -> Option<Self> {
        let has_video = raw.has_video();
        let has_audio = raw.has_audio();
        if !has_video && !has_audio {
            return None;
        }

        Some(Self {
            id: raw.format_id.clone(),
            quality_label: quality_label(raw, has_video),
            resolution: resolution(raw),
            extension: raw.ext.clone().unwrap_or_else(|| "unknown".to_string()),
            has_video,
            has_audio,
            size_bytes: raw.filesize.or(raw.filesize_approx),
            audio_bitrate_kbps: raw.abr,
            fps: raw.fps,
            protocol: raw.protocol.clone(),
        })
    }

    pub fn is_combined(&self) -> bool {
        self.has_video && self.has_audio
    }

    pub fn is_video_only(&self) -> bool {
        self.has_video && !self.has_audio
    }

    pub fn is_audio_only(&self) -> bool {
        !self.has_video && self.has_audio
    }

    /// Size in MB rounded to one decimal
    pub fn size_mb(&self) -> Option<f64> {
        self.size_bytes.map(bytes_to_mb)
    }
}

impl fmt::Display for EncodingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.quality_label, self.extension)?;
        match self.size_mb() {
            Some(mb) => write!(f, " - {:.1} MB", mb),
            None => write!(f, " - unknown size"),
        }
    }
}

/// Convert bytes to MB, rounded to one decimal
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 10.0).round() / 10.0
}

fn quality_label(raw: &RawEncoding, has_video: bool) -> String {
    if let Some(note) = raw.format_note.as_deref().map(str::trim) {
        if !note.is_empty() {
            return note.to_string();
        }
    }
    if has_video {
        if let Some(height) = raw.height {
            return format!("{}p", height);
        }
    }
    if let Some(abr) = raw.abr {
        return format!("{}kbps", abr.round() as u32);
    }
    "unknown".to_string()
}

fn resolution(raw: &RawEncoding) -> Option<String> {
    if let Some(res) = raw.resolution.as_deref() {
        let mut parts = res.split('x');
        let is_wxh = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(w), Some(h), None)
                if !w.is_empty() && !h.is_empty()
                    && w.chars().all(|c| c.is_ascii_digit())
                    && h.chars().all(|c| c.is_ascii_digit())
        );
        if is_wxh {
            return Some(res.to_string());
        }
    }
    match (raw.width, raw.height) {
        (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
        _ => None,
    }
}

/// Every encoding discovered for one URL, classified and sorted.
///
/// Buckets are ordered best-first and never change after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormatCatalog {
    combined: Vec<EncodingDescriptor>,
    video_only: Vec<EncodingDescriptor>,
    audio_only: Vec<EncodingDescriptor>,
}

impl FormatCatalog {
    /// Classify raw backend encodings
    pub fn build(raw: &[RawEncoding]) -> Self {
        Self::from_descriptors(raw.iter().filter_map(EncodingDescriptor::from_raw))
    }

    /// Bucket and sort descriptors. Descriptors without audio or video are
    /// dropped; equal scores keep their input order.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = EncodingDescriptor>,
    {
        let mut catalog = Self::default();

        for descriptor in descriptors {
            match (descriptor.has_video, descriptor.has_audio) {
                (true, true) => catalog.combined.push(descriptor),
                (true, false) => catalog.video_only.push(descriptor),
                (false, true) => catalog.audio_only.push(descriptor),
                (false, false) => {}
            }
        }

        // sort_by_key is stable
        for bucket in [
            &mut catalog.combined,
            &mut catalog.video_only,
            &mut catalog.audio_only,
        ] {
            bucket.sort_by_key(|d| Reverse(score_descriptor(d)));
        }

        catalog
    }

    pub fn combined(&self) -> &[EncodingDescriptor] {
        &self.combined
    }

    pub fn video_only(&self) -> &[EncodingDescriptor] {
        &self.video_only
    }

    pub fn audio_only(&self) -> &[EncodingDescriptor] {
        &self.audio_only
    }

    /// All encodings in lookup order: combined, video-only, audio-only
    pub fn iter(&self) -> impl Iterator<Item = &EncodingDescriptor> {
        self.combined
            .iter()
            .chain(&self.video_only)
            .chain(&self.audio_only)
    }

    /// Candidates for a video quality request
    pub fn video_candidates(&self) -> impl Iterator<Item = &EncodingDescriptor> {
        self.combined.iter().chain(&self.video_only)
    }

    pub fn find(&self, id: &str) -> Option<&EncodingDescriptor> {
        self.iter().find(|d| d.id == id)
    }

    pub fn best_video(&self) -> Option<&EncodingDescriptor> {
        self.combined.first()
    }

    pub fn best_audio(&self) -> Option<&EncodingDescriptor> {
        self.audio_only.first()
    }

    pub fn len(&self) -> usize {
        self.combined.len() + self.video_only.len() + self.audio_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
