//! Quality requests and tier tables

use crate::utils::error::ParseQualityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named video quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityTier {
    P2160,
    P1440,
    P1080,
    P720,
    P480,
    P360,
    P240,
}

impl QualityTier {
    /// Scoring priority order
    pub const ALL: [QualityTier; 7] = [
        QualityTier::P2160,
        QualityTier::P1440,
        QualityTier::P1080,
        QualityTier::P720,
        QualityTier::P480,
        QualityTier::P360,
        QualityTier::P240,
    ];

    /// Vertical resolution in pixels
    pub fn height(self) -> u32 {
        match self {
            QualityTier::P2160 => 2160,
            QualityTier::P1440 => 1440,
            QualityTier::P1080 => 1080,
            QualityTier::P720 => 720,
            QualityTier::P480 => 480,
            QualityTier::P360 => 360,
            QualityTier::P240 => 240,
        }
    }

    /// Lowercase substrings that identify this tier inside a label
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            QualityTier::P2160 => &["4k", "2160"],
            QualityTier::P1440 => &["1440"],
            QualityTier::P1080 => &["1080"],
            QualityTier::P720 => &["720"],
            QualityTier::P480 => &["480"],
            QualityTier::P360 => &["360"],
            QualityTier::P240 => &["240"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::P2160 => "4k",
            QualityTier::P1440 => "1440",
            QualityTier::P1080 => "1080",
            QualityTier::P720 => "720",
            QualityTier::P480 => "480",
            QualityTier::P360 => "360",
            QualityTier::P240 => "240",
        }
    }
}

impl FromStr for QualityTier {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let bare = lower.strip_suffix('p').unwrap_or(&lower);
        match bare {
            "4k" | "2160" => Ok(QualityTier::P2160),
            "1440" => Ok(QualityTier::P1440),
            "1080" => Ok(QualityTier::P1080),
            "720" => Ok(QualityTier::P720),
            "480" => Ok(QualityTier::P480),
            "360" => Ok(QualityTier::P360),
            "240" => Ok(QualityTier::P240),
            _ => Err(ParseQualityError(s.to_string())),
        }
    }
}

/// What the caller wants downloaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QualityRequest {
    /// Highest-scored video encoding available
    #[default]
    Best,
    /// Encoding closest to a named tier
    Tier(QualityTier),
    /// A backend-assigned encoding id from a prior resolution
    EncodingId(String),
}

impl QualityRequest {
    /// Numeric target for nearest-score matching. `Best` aims above any real
    /// score so the highest available one wins. Explicit ids have no target.
    pub fn target_score(&self) -> Option<u32> {
        match self {
            QualityRequest::Best => Some(u32::MAX),
            QualityRequest::Tier(tier) => Some(tier.height()),
            QualityRequest::EncodingId(_) => None,
        }
    }
}

impl fmt::Display for QualityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityRequest::Best => f.write_str("best"),
            QualityRequest::Tier(tier) => f.write_str(tier.as_str()),
            QualityRequest::EncodingId(id) => write!(f, "id:{}", id),
        }
    }
}

/// Accepts `best`, any tier spelling (`1080`, `1080p`, `4K`) and `id:<format id>`
impl FromStr for QualityRequest {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("best") {
            return Ok(QualityRequest::Best);
        }
        if let Some(id) = trimmed.strip_prefix("id:") {
            if id.is_empty() {
                return Err(ParseQualityError(s.to_string()));
            }
            return Ok(QualityRequest::EncodingId(id.to_string()));
        }
        trimmed.parse().map(QualityRequest::Tier)
    }
}

impl TryFrom<String> for QualityRequest {
    type Error = ParseQualityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QualityRequest> for String {
    fn from(request: QualityRequest) -> Self {
        request.to_string()
    }
}

/// Audio extraction quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioTier {
    #[default]
    Best,
    High,
    Medium,
    Low,
}

impl AudioTier {
    /// Target bitrate in kbps; `None` keeps the highest the source offers
    pub fn bitrate_kbps(self) -> Option<u32> {
        match self {
            AudioTier::Best => None,
            AudioTier::High => Some(192),
            AudioTier::Medium => Some(128),
            AudioTier::Low => Some(96),
        }
    }

    /// Value for yt-dlp's `--audio-quality`
    pub fn ytdlp_quality(self) -> String {
        match self.bitrate_kbps() {
            Some(kbps) => format!("{}K", kbps),
            None => "0".to_string(),
        }
    }

    /// Label reported back on the download result
    pub fn label(self) -> String {
        match self.bitrate_kbps() {
            Some(kbps) => format!("{}kbps", kbps),
            None => "best".to_string(),
        }
    }
}

impl FromStr for AudioTier {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(AudioTier::Best),
            "high" => Ok(AudioTier::High),
            "medium" => Ok(AudioTier::Medium),
            "low" => Ok(AudioTier::Low),
            _ => Err(ParseQualityError(s.to_string())),
        }
    }
}
