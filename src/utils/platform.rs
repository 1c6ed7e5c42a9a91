//! Source platform classification for display
//!
//! Never gates behavior: any URL is accepted and unknown hosts get the
//! generic label.

use serde::Serialize;
use std::fmt;
use url::Url;

/// Label used when no known platform matches
pub const OTHER_PLATFORM: &str = "Other platform";

/// Known media platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourcePlatform {
    YouTube,
    TikTok,
    Instagram,
    Twitter,
    Facebook,
    Vimeo,
    Dailymotion,
    Twitch,
    Reddit,
    SoundCloud,
}

impl SourcePlatform {
    pub const ALL: [SourcePlatform; 10] = [
        SourcePlatform::YouTube,
        SourcePlatform::TikTok,
        SourcePlatform::Instagram,
        SourcePlatform::Twitter,
        SourcePlatform::Facebook,
        SourcePlatform::Vimeo,
        SourcePlatform::Dailymotion,
        SourcePlatform::Twitch,
        SourcePlatform::Reddit,
        SourcePlatform::SoundCloud,
    ];

    /// Registrable domains that belong to this platform
    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            SourcePlatform::YouTube => &["youtube.com", "youtu.be"],
            SourcePlatform::TikTok => &["tiktok.com"],
            SourcePlatform::Instagram => &["instagram.com"],
            SourcePlatform::Twitter => &["twitter.com", "x.com"],
            SourcePlatform::Facebook => &["facebook.com", "fb.watch"],
            SourcePlatform::Vimeo => &["vimeo.com"],
            SourcePlatform::Dailymotion => &["dailymotion.com", "dai.ly"],
            SourcePlatform::Twitch => &["twitch.tv"],
            SourcePlatform::Reddit => &["reddit.com", "redd.it"],
            SourcePlatform::SoundCloud => &["soundcloud.com"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourcePlatform::YouTube => "YouTube",
            SourcePlatform::TikTok => "TikTok",
            SourcePlatform::Instagram => "Instagram",
            SourcePlatform::Twitter => "Twitter/X",
            SourcePlatform::Facebook => "Facebook",
            SourcePlatform::Vimeo => "Vimeo",
            SourcePlatform::Dailymotion => "Dailymotion",
            SourcePlatform::Twitch => "Twitch",
            SourcePlatform::Reddit => "Reddit",
            SourcePlatform::SoundCloud => "SoundCloud",
        }
    }

    /// Detect the platform of `url`.
    ///
    /// Parsed URLs match on the host (exact or subdomain) so that e.g.
    /// `netflix.com` is not mistaken for X. Unparseable input falls back to
    /// substring matching.
    pub fn detect(url: &str) -> Option<Self> {
        match Url::parse(url.trim()) {
            Ok(parsed) => {
                let host = parsed.host_str()?.to_ascii_lowercase();
                Self::ALL.into_iter().find(|p| {
                    p.domains()
                        .iter()
                        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
                })
            }
            Err(_) => {
                let lowered = url.to_ascii_lowercase();
                Self::ALL
                    .into_iter()
                    .find(|p| p.domains().iter().any(|d| lowered.contains(d)))
            }
        }
    }
}

impl fmt::Display for SourcePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable source label for `url`
pub fn classify(url: &str) -> &'static str {
    SourcePlatform::detect(url)
        .map(|p| p.label())
        .unwrap_or(OTHER_PLATFORM)
}
