//! Extraction backends: yt-dlp and the placeholder used when it is missing

pub mod degraded;
pub mod models;
pub mod traits;
pub mod ytdlp;

pub use degraded::DegradedBackend;
pub use models::{AudioExtraction, FetchRequest, FetchedMedia, ProbeInfo, RawEncoding};
pub use traits::Backend;
pub use ytdlp::{find_ytdlp, YtDlpBackend};
