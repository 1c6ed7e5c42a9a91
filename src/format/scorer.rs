//! Quality scoring
//!
//! Every comparison between encodings, both when sorting a catalog and when
//! matching a request, goes through [`score`]. The token table lives on
//! [`QualityTier`] so the tier targets and the label scores cannot drift apart.

use crate::format::descriptor::EncodingDescriptor;
use crate::format::request::QualityTier;

/// Map a free-form quality label ("1080p", "4K", "720p HD", "128kbps") to a
/// comparable integer.
///
/// Known tokens are checked in priority order; otherwise the first run of
/// digits is used as-is, and a label without digits scores 0.
pub fn score(label: &str) -> u32 {
    let lower = label.to_lowercase();

    for tier in QualityTier::ALL {
        if tier.tokens().iter().any(|token| lower.contains(token)) {
            return tier.height();
        }
    }

    first_number(&lower).unwrap_or(0)
}

/// Score used to order a descriptor inside its bucket: the label score for
/// video buckets, the reported bitrate for audio-only entries.
pub fn score_descriptor(descriptor: &EncodingDescriptor) -> u32 {
    if descriptor.is_audio_only() {
        if let Some(abr) = descriptor.audio_bitrate_kbps {
            if abr.is_finite() && abr > 0.0 {
                // float-to-int `as` saturates
                return abr.round() as u32;
            }
        }
    }
    score(&descriptor.quality_label)
}

/// First run of ASCII digits, saturating at `u32::MAX`
fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or("");

    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}
