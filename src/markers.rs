//! Replay marker types and intensity normalization.
//!
//! Markers arrive either pre-bucketed from the page's embedded player data
//! or as a stitched coordinate curve from the rendered heatmap. Either way
//! they pass through [`normalize_markers`] so downstream ranking always sees
//! scores in `[0, 1]` with the strongest marker at exactly 1.0.

use crate::path_engine::Coordinate;

/// Marker type label the player attaches to replay heatmaps.
pub const HEATMAP_MARKER_TYPE: &str = "MARKER_TYPE_HEATMAP";

/// A time-bucketed intensity sample before scaling.
#[derive(Debug, Clone)]
pub struct RawMarker {
    pub start_millis: f64,
    pub duration_millis: f64,
    /// Unscaled intensity. NaN marks a corrupt sample; it normalizes to 0.
    pub intensity_raw: f64,
}

/// A marker list together with the player's type label.
#[derive(Debug, Clone)]
pub struct HeatmapData {
    pub marker_type: String,
    pub markers: Vec<RawMarker>,
}

/// A marker scaled into `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMarker {
    pub start_millis: f64,
    pub duration_millis: f64,
    pub intensity_score_normalized: f64,
}

/// Convert a stitched heatmap curve into time-bucketed raw markers.
///
/// The bucket width divides the video length by the unfiltered point count,
/// so buckets keep spanning the whole video even when corrupt samples are
/// dropped. Raw intensity is the point's vertical deflection from the curve
/// baseline (the largest y seen): SVG y grows downward, so peaks sit above
/// the baseline and deflection grows with replay intensity. Measuring from
/// the baseline also makes the result invariant under fragment translation.
pub fn markers_from_points(points: &[Coordinate], video_length_secs: u64) -> Vec<RawMarker> {
    if points.is_empty() {
        return Vec::new();
    }
    let segment_duration_ms = (video_length_secs as f64 * 1000.0) / points.len() as f64;

    let valid: Vec<Coordinate> = points.iter().copied().filter(|p| p.y.is_finite()).collect();
    if valid.is_empty() {
        return Vec::new();
    }
    let baseline = valid.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    valid
        .iter()
        .enumerate()
        .map(|(i, point)| RawMarker {
            start_millis: i as f64 * segment_duration_ms,
            duration_millis: segment_duration_ms,
            intensity_raw: baseline - point.y,
        })
        .collect()
}

/// Scale raw markers into `[0, 1]`.
///
/// The largest finite raw intensity maps to exactly 1.0. When no positive
/// finite intensity exists (a flat curve, or every sample corrupt) all
/// scores are 0.0 rather than dividing by zero.
pub fn normalize_markers(markers: &[RawMarker]) -> Vec<NormalizedMarker> {
    let max = markers
        .iter()
        .map(|m| m.intensity_raw)
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let scale = if max > 0.0 { Some(max) } else { None };

    markers
        .iter()
        .map(|m| NormalizedMarker {
            start_millis: m.start_millis,
            duration_millis: m.duration_millis,
            intensity_score_normalized: match scale {
                Some(max) if m.intensity_raw.is_finite() => {
                    (m.intensity_raw / max).clamp(0.0, 1.0)
                }
                _ => 0.0,
            },
        })
        .collect()
}
