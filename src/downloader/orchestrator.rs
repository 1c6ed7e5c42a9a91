//! Download orchestration
//!
//! Ties a [`Backend`] to the format catalog and matcher and normalizes every
//! outcome into a [`DownloadResult`]. Holds no mutable state; share it with
//! an `Arc` and run one task per download.

use crate::downloader::media::{DownloadResult, DownloadedMedia, MediaInfo};
use crate::downloader::progress::TransferProgress;
use crate::extractor::degraded::{DegradedBackend, DEGRADED_ID};
use crate::extractor::models::{AudioExtraction, FetchRequest, FetchedMedia, ProbeInfo};
use crate::extractor::traits::Backend;
use crate::extractor::ytdlp::YtDlpBackend;
use crate::format::descriptor::{bytes_to_mb, FormatCatalog};
use crate::format::matcher::match_encoding;
use crate::format::request::{AudioTier, QualityRequest};
use crate::utils::config::AppSettings;
use crate::utils::error::MediaError;
use crate::utils::platform;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Format selector for audio extraction
pub const AUDIO_FORMAT: &str = "bestaudio/best";
/// Container for extracted audio
pub const AUDIO_CODEC: &str = "mp3";

const DEFAULT_MAX_CONCURRENT: usize = 5;

pub struct DownloadOrchestrator {
    backend: Arc<dyn Backend>,
    max_concurrent: usize,
}

impl DownloadOrchestrator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Build the engine for this process. Falls back to placeholder data
    /// when yt-dlp cannot be located; the choice is made once here.
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::from_lookup(YtDlpBackend::from_settings(settings), settings)
    }

    /// Pick the backend from the outcome of a yt-dlp lookup
    pub fn from_lookup(lookup: Result<YtDlpBackend, MediaError>, settings: &AppSettings) -> Self {
        let backend: Arc<dyn Backend> = match lookup {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                warn!("{}; running in degraded mode with placeholder data", e);
                Arc::new(DegradedBackend::new())
            }
        };

        Self::new(backend).with_max_concurrent(settings.max_concurrent)
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn backend_id(&self) -> &'static str {
        self.backend.id()
    }

    /// Informational only; degraded mode goes through the same paths
    pub fn is_degraded(&self) -> bool {
        self.backend.id() == DEGRADED_ID
    }

    /// One metadata-only probe, partitioned and sorted
    pub async fn resolve(&self, url: &str) -> Result<FormatCatalog, MediaError> {
        let info = self.probe(url).await?;
        let catalog = FormatCatalog::build(&info.formats);
        info!(
            "Resolved {} encodings for {} ({} combined, {} video-only, {} audio-only)",
            catalog.len(),
            url,
            catalog.combined().len(),
            catalog.video_only().len(),
            catalog.audio_only().len()
        );
        Ok(catalog)
    }

    /// Metadata summary plus catalog from the same probe
    pub async fn inspect(&self, url: &str) -> Result<MediaInfo, MediaError> {
        let info = self.probe(url).await?;
        let catalog = FormatCatalog::build(&info.formats);

        Ok(MediaInfo {
            title: info.title,
            uploader: info.uploader,
            duration_secs: info.duration,
            view_count: info.view_count,
            upload_date: info.upload_date,
            webpage_url: info.webpage_url,
            extractor: info.extractor,
            platform: platform::classify(url),
            catalog,
        })
    }

    pub async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        request: &QualityRequest,
    ) -> DownloadResult {
        self.download_with_progress(url, output_dir, request, None)
            .await
    }

    /// Like [`download`](Self::download), forwarding transfer progress to
    /// `progress` while yt-dlp runs
    pub async fn download_with_progress(
        &self,
        url: &str,
        output_dir: &Path,
        request: &QualityRequest,
        progress: Option<mpsc::Sender<TransferProgress>>,
    ) -> DownloadResult {
        let catalog = self.resolve(url).await?;

        let chosen = match_encoding(&catalog, request).ok_or_else(|| {
            warn!("No encoding of {} satisfies {}", url, request);
            MediaError::NoMatchingEncoding {
                requested: request.to_string(),
            }
        })?;

        let fetch = FetchRequest::new(url, &chosen.id, output_dir.to_path_buf())
            .with_progress(progress);
        self.transfer(fetch, |_| chosen.quality_label.clone()).await
    }

    /// Download one encoding picked from a previously rendered catalog
    pub async fn download_by_encoding_id(
        &self,
        url: &str,
        output_dir: &Path,
        encoding_id: &str,
    ) -> DownloadResult {
        self.download(
            url,
            output_dir,
            &QualityRequest::EncodingId(encoding_id.to_string()),
        )
        .await
    }

    /// Best audio stream converted to mp3 at the tier's bitrate. The label
    /// is the tier's bitrate, or the source bitrate for `Best`.
    pub async fn download_audio(
        &self,
        url: &str,
        output_dir: &Path,
        tier: AudioTier,
    ) -> DownloadResult {
        let fetch = FetchRequest::new(url, AUDIO_FORMAT, output_dir.to_path_buf()).with_audio(
            AudioExtraction {
                codec: AUDIO_CODEC.to_string(),
                quality: tier.ytdlp_quality(),
            },
        );
        self.transfer(fetch, |fetched| audio_label(tier, fetched)).await
    }

    /// Download several URLs with at most `max_concurrent` in flight.
    /// Results come back in input order.
    pub async fn download_batch(
        &self,
        urls: &[String],
        output_dir: &Path,
        request: &QualityRequest,
    ) -> Vec<(String, DownloadResult)> {
        info!(
            "Starting batch of {} downloads ({} at a time)",
            urls.len(),
            self.max_concurrent
        );

        stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let result = self.download(&url, output_dir, request).await;
                (url, result)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    pub fn classify_platform(&self, url: &str) -> &'static str {
        platform::classify(url)
    }

    async fn probe(&self, url: &str) -> Result<ProbeInfo, MediaError> {
        debug!("Probing {} via {}", url, self.backend.id());
        self.backend.probe(url).await.map_err(|e| {
            error!("Extraction failed for {}: {}", url, e);
            match e {
                MediaError::Extraction(message) => MediaError::Extraction(message),
                other => MediaError::Extraction(other.to_string()),
            }
        })
    }

    async fn transfer<F>(&self, request: FetchRequest, quality_label: F) -> DownloadResult
    where
        F: FnOnce(&FetchedMedia) -> String,
    {
        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| {
                MediaError::Transfer(format!(
                    "cannot create {}: {}",
                    request.output_dir.display(),
                    e
                ))
            })?;

        info!(
            "Downloading {} (encoding {}) into {}",
            request.url,
            request.format,
            request.output_dir.display()
        );

        let fetched = self.backend.fetch(&request).await.map_err(|e| {
            error!("Transfer failed for {}: {}", request.url, e);
            match e {
                MediaError::Transfer(message) => MediaError::Transfer(message),
                other => MediaError::Transfer(other.to_string()),
            }
        })?;

        let size_bytes = match tokio::fs::metadata(&fetched.local_path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(
                    "Cannot stat {}: {}; using reported size",
                    fetched.local_path.display(),
                    e
                );
                fetched.reported_size.unwrap_or(0)
            }
        };

        let quality_label = quality_label(&fetched);
        let file_name = fetched
            .local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!("Finished {} ({} bytes)", file_name, size_bytes);

        Ok(DownloadedMedia {
            file_path: fetched.local_path,
            file_name,
            title: fetched.title,
            size_bytes,
            size_mb: bytes_to_mb(size_bytes),
            quality_label,
            encoding_id: request.format,
        })
    }
}

fn audio_label(tier: AudioTier, fetched: &FetchedMedia) -> String {
    match tier
        .bitrate_kbps()
        .or_else(|| fetched.audio_bitrate_kbps.map(|abr| abr.round() as u32))
    {
        Some(kbps) => format!("{}kbps", kbps),
        None => tier.label(),
    }
}
