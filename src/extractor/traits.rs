use crate::extractor::models::{FetchRequest, FetchedMedia, ProbeInfo};
use crate::utils::error::MediaError;
use async_trait::async_trait;

/// Core trait for extraction backends
///
/// Isolates the engine from how metadata is fetched and files are
/// transferred (yt-dlp process, placeholder data, test doubles). Both calls
/// are single attempts; retry policy belongs to the caller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns a unique identifier for this backend (e.g., "yt-dlp", "degraded")
    fn id(&self) -> &'static str;

    /// Metadata-only query. Failures are `MediaError::Extraction`.
    async fn probe(&self, url: &str) -> Result<ProbeInfo, MediaError>;

    /// Transfer one encoding into `request.output_dir`. Failures are
    /// `MediaError::Transfer`.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedMedia, MediaError>;
}
