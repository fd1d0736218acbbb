//! Offline pipeline tests driven by captured watch page fixtures.
//!
//! These exercise the same pages the browser scenarios use, but feed the
//! markup straight into the extraction code, so they run without Chrome.

mod common;

use common::load_fixture;
use replaypeaks::markers::normalize_markers;
use replaypeaks::path_engine::ArtifactWindow;
use replaypeaks::ranker::top_replayed_parts;
use replaypeaks::strategy::embedded::scan_page_for_markers;
use replaypeaks::strategy::heatmap_svg::page_extraction;

#[test]
fn test_embedded_fixture_ranks_expected_parts() {
    let html = load_fixture("embedded_watch.html");

    let extraction = scan_page_for_markers(&html).expect("fixture carries player data");
    assert_eq!(extraction.video_length_secs, Some(100));
    assert_eq!(extraction.heatmap.markers.len(), 20);
    assert_eq!(extraction.heatmap.marker_type, "MARKER_TYPE_HEATMAP");

    let normalized = normalize_markers(&extraction.heatmap.markers);
    let parts = top_replayed_parts(&normalized, 3);

    assert_eq!(parts.len(), 3);
    assert_eq!((parts[0].position, parts[0].start, parts[0].end), (1, 40, 45));
    assert_eq!((parts[1].position, parts[1].start, parts[1].end), (2, 70, 75));
    assert_eq!((parts[2].position, parts[2].start, parts[2].end), (3, 15, 20));
}

#[test]
fn test_embedded_fixture_peak_normalizes_to_one() {
    let html = load_fixture("embedded_watch.html");
    let extraction = scan_page_for_markers(&html).unwrap();

    let normalized = normalize_markers(&extraction.heatmap.markers);
    let peak = normalized
        .iter()
        .map(|m| m.intensity_score_normalized)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(peak, 1.0);
}

#[test]
fn test_svg_fixture_ranks_expected_part() {
    let html = load_fixture("svg_watch.html");

    let extraction =
        page_extraction(&html, ArtifactWindow::default()).expect("fixture carries a heatmap");
    assert_eq!(extraction.video_length_secs, Some(100));
    // Two 25 point chapters stitch to 50, minus 15 flagged at the joint.
    assert_eq!(extraction.heatmap.markers.len(), 35);

    let normalized = normalize_markers(&extraction.heatmap.markers);
    let parts = top_replayed_parts(&normalized, 1);

    assert_eq!(parts.len(), 1);
    assert_eq!((parts[0].position, parts[0].start, parts[0].end), (1, 74, 77));
}

#[test]
fn test_bare_fixture_offers_no_source() {
    let html = load_fixture("bare_watch.html");

    assert!(scan_page_for_markers(&html).is_none());
    assert!(page_extraction(&html, ArtifactWindow::default()).is_none());
}

#[test]
fn test_ad_fixtures_still_carry_player_data() {
    // The overlay markup must not break the embedded data scan.
    for fixture in ["ad_overlay_watch.html", "ad_overlay_stuck_watch.html"] {
        let html = load_fixture(fixture);
        let extraction = scan_page_for_markers(&html)
            .unwrap_or_else(|| panic!("{} should carry player data", fixture));
        assert_eq!(extraction.heatmap.markers.len(), 20);
    }
}

#[test]
fn test_requesting_more_parts_than_markers_returns_all() {
    let html = load_fixture("embedded_watch.html");
    let extraction = scan_page_for_markers(&html).unwrap();

    let normalized = normalize_markers(&extraction.heatmap.markers);
    let parts = top_replayed_parts(&normalized, 500);

    assert_eq!(parts.len(), 20);
    assert_eq!(parts.last().unwrap().position, 20);
    // Weakest bucket in the fixture sits at the very end of the video.
    assert_eq!(parts.last().unwrap().start, 95);
}
