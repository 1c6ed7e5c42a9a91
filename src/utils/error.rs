//! Error handling for Medialoader

use thiserror::Error;

/// Main error type for Medialoader
///
/// Backend messages for extraction and transfer failures are kept verbatim so
/// callers can show them to the user unchanged.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    /// Probe failed: bad URL, network failure, unsupported site, unparsable output.
    #[error("{0}")]
    Extraction(String),

    /// The catalog was obtained but nothing in it satisfies the request.
    #[error("no matching encoding for requested quality")]
    NoMatchingEncoding { requested: String },

    /// Fetch failed after a successful probe.
    #[error("{0}")]
    Transfer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A quality or audio tier string that matches no known tier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown quality tier: {0}")]
pub struct ParseQualityError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_messages_are_verbatim() {
        let err = MediaError::Extraction("ERROR: Unsupported URL: https://x".to_string());
        assert_eq!(err.to_string(), "ERROR: Unsupported URL: https://x");

        let err = MediaError::Transfer("ERROR: Video unavailable".to_string());
        assert_eq!(err.to_string(), "ERROR: Video unavailable");
    }

    #[test]
    fn test_no_matching_encoding_message() {
        let err = MediaError::NoMatchingEncoding {
            requested: "1080".to_string(),
        };
        assert_eq!(err.to_string(), "no matching encoding for requested quality");
    }
}
