//! Placeholder backend used when no extractor is available
//!
//! Serves a fixed catalog and fixed download results through the regular
//! [`Backend`] contract, so nothing upstream has to know which mode it is in.

use crate::extractor::models::{FetchRequest, FetchedMedia, ProbeInfo, RawEncoding};
use crate::extractor::traits::Backend;
use crate::utils::error::MediaError;
use async_trait::async_trait;
use tracing::warn;

const MB: u64 = 1024 * 1024;

/// Backend id reported in degraded mode
pub const DEGRADED_ID: &str = "degraded";

pub const PLACEHOLDER_VIDEO: &str = "test_video.mp4";
pub const PLACEHOLDER_AUDIO: &str = "test_audio.mp3";

#[derive(Debug, Default, Clone, Copy)]
pub struct DegradedBackend;

impl DegradedBackend {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    fn encoding(
        id: &str,
        note: &str,
        resolution: Option<(u32, u32)>,
        ext: &str,
        vcodec: &str,
        acodec: &str,
        abr: Option<f32>,
        size_tenths_mb: u64,
    ) -> RawEncoding {
        RawEncoding {
            format_id: id.to_string(),
            format_note: Some(note.to_string()),
            ext: Some(ext.to_string()),
            resolution: resolution.map(|(w, h)| format!("{}x{}", w, h)),
            width: resolution.map(|(w, _)| w),
            height: resolution.map(|(_, h)| h),
            vcodec: Some(vcodec.to_string()),
            acodec: Some(acodec.to_string()),
            filesize: Some(size_tenths_mb * MB / 10),
            abr,
            ..Default::default()
        }
    }

    /// The fixed encodings every probe returns
    pub fn encodings() -> Vec<RawEncoding> {
        vec![
            Self::encoding("22", "720p", Some((1280, 720)), "mp4", "avc1", "mp4a", None, 255),
            Self::encoding("18", "360p", Some((640, 360)), "mp4", "avc1", "mp4a", None, 152),
            Self::encoding("137", "1080p", Some((1920, 1080)), "mp4", "avc1", "none", None, 450),
            Self::encoding("136", "720p", Some((1280, 720)), "mp4", "avc1", "none", None, 300),
            Self::encoding("140", "128kbps", None, "m4a", "none", "mp4a", Some(128.0), 35),
            Self::encoding("139", "48kbps", None, "m4a", "none", "mp4a", Some(48.0), 15),
        ]
    }
}

#[async_trait]
impl Backend for DegradedBackend {
    fn id(&self) -> &'static str {
        DEGRADED_ID
    }

    async fn probe(&self, url: &str) -> Result<ProbeInfo, MediaError> {
        warn!("Serving placeholder catalog for {} (no extractor available)", url);
        Ok(ProbeInfo {
            id: "placeholder".to_string(),
            title: "Sample video".to_string(),
            uploader: Some("Sample channel".to_string()),
            duration: Some(180.0),
            view_count: Some(1000),
            upload_date: Some("20240101".to_string()),
            webpage_url: Some(url.to_string()),
            extractor: Some(self.id().to_string()),
            formats: Self::encodings(),
        })
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedMedia, MediaError> {
        warn!(
            "Returning placeholder download for {} (no extractor available)",
            request.url
        );
        let (file, title, size, abr) = if request.audio.is_some() {
            (PLACEHOLDER_AUDIO, "Sample audio", 35 * MB / 10, Some(128.0))
        } else {
            (PLACEHOLDER_VIDEO, "Sample video", 255 * MB / 10, None)
        };

        Ok(FetchedMedia {
            local_path: request.output_dir.join(file),
            title: title.to_string(),
            reported_size: Some(size),
            audio_bitrate_kbps: abr,
        })
    }
}
