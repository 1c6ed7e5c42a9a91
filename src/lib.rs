//! Medialoader library
//!
//! Resolves the encodings a media URL offers, matches a symbolic quality
//! request to the nearest one and downloads it through yt-dlp.

pub mod downloader;
pub mod extractor;
pub mod format;
pub mod utils;

// Re-export main types for easier use
pub use downloader::{
    DownloadOrchestrator, DownloadResult, DownloadedMedia, MediaInfo, TransferProgress,
};
pub use extractor::{Backend, DegradedBackend, YtDlpBackend};
pub use format::{AudioTier, EncodingDescriptor, FormatCatalog, QualityRequest, QualityTier};
pub use utils::{AppSettings, MediaError};
