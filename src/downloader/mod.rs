//! Download orchestration and progress reporting

pub mod media;
pub mod orchestrator;
pub mod progress;

pub use media::{DownloadResult, DownloadedMedia, MediaInfo};
pub use orchestrator::DownloadOrchestrator;
pub use progress::TransferProgress;
