//! Ranking of normalized markers into positioned replay segments.

use serde::Serialize;

use crate::markers::NormalizedMarker;

/// One most-replayed segment, ranked by intensity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayedPart {
    /// 1-based rank; 1 is the most replayed segment.
    pub position: usize,
    /// Segment start in whole seconds.
    pub start: u64,
    /// Segment end in whole seconds.
    pub end: u64,
}

/// Sort markers by intensity (best first) and return the top `count` as
/// positioned segments. The sort is stable, so markers with equal intensity
/// keep their time order. Millisecond times round to whole seconds.
pub fn top_replayed_parts(markers: &[NormalizedMarker], count: usize) -> Vec<ReplayedPart> {
    let mut ranked: Vec<&NormalizedMarker> = markers.iter().collect();
    ranked.sort_by(|a, b| {
        b.intensity_score_normalized
            .partial_cmp(&a.intensity_score_normalized)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, marker)| {
            let start = (marker.start_millis / 1000.0).round() as u64;
            let end = ((marker.start_millis + marker.duration_millis) / 1000.0).round() as u64;
            ReplayedPart {
                position: i + 1,
                start,
                end,
            }
        })
        .collect()
}
