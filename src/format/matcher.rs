//! Nearest-quality matching
//!
//! Greedy and deterministic: the candidate with the smallest score distance
//! wins, ties go to the earlier candidate. There is no distance cutoff, so a
//! 1080 request against a 360-only catalog returns the 360 encoding.

use crate::format::descriptor::{EncodingDescriptor, FormatCatalog};
use crate::format::request::QualityRequest;
use crate::format::scorer::score;
use tracing::debug;

/// Select the encoding that best satisfies `request`, or `None` when the
/// catalog has nothing usable.
pub fn match_encoding<'a>(
    catalog: &'a FormatCatalog,
    request: &QualityRequest,
) -> Option<&'a EncodingDescriptor> {
    let target = match request {
        QualityRequest::EncodingId(id) => return catalog.find(id),
        other => other.target_score()?,
    };

    let mut best: Option<(&EncodingDescriptor, u64)> = None;
    for candidate in catalog.video_candidates() {
        let distance = distance(score(&candidate.quality_label), target);
        // strict comparison keeps the earliest candidate on ties
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }

    if let Some((chosen, distance)) = best {
        debug!(
            "Matched {} to encoding {} ({}), distance {}",
            request, chosen.id, chosen.quality_label, distance
        );
    }

    best.map(|(chosen, _)| chosen)
}

fn distance(score: u32, target: u32) -> u64 {
    (i64::from(score) - i64::from(target)).unsigned_abs()
}
