//! Extraction from the rendered heatmap SVG.
//!
//! When the page carries no usable player data blob, the heatmap still
//! gets drawn above the progress bar as one SVG path per chapter. This
//! strategy waits for the player chrome to render, pulls the path data
//! out of the live DOM and rebuilds intensity markers from the curve
//! geometry. Slower and noisier than the embedded blob, hence fallback.

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use crate::browser::PageSession;
use crate::config::{ExtractionConfig, StitchConfig};
use crate::markers::{markers_from_points, HeatmapData, HEATMAP_MARKER_TYPE};
use crate::path_engine::{stitch_fragments, ArtifactWindow};
use crate::strategy::{Extraction, MarkerStrategy};

const HEATMAP_SVG: &str = ".ytp-heat-map-svg";
const PROGRESS_BAR: &str = ".ytp-progress-bar";

// The \s keeps this from matching attributes that merely end in "d".
static PATH_DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<path[^>]*?\sd="([^"]*)""#).unwrap()
});

pub struct HeatmapSvg {
    selector_wait: Duration,
    max_retries: u32,
    window: ArtifactWindow,
}

impl HeatmapSvg {
    pub fn new(extraction: &ExtractionConfig, stitch: &StitchConfig) -> Self {
        Self {
            selector_wait: Duration::from_secs(extraction.selector_wait_secs),
            max_retries: extraction.max_retries,
            window: stitch.artifact_window(),
        }
    }

    fn try_once(&self, session: &PageSession, wait: Duration) -> Result<Option<Extraction>> {
        let tab = session.tab();
        tab.wait_for_element_with_custom_timeout(HEATMAP_SVG, wait)
            .map_err(|e| anyhow!("Heatmap graphic not rendered: {}", e))?;
        tab.wait_for_element_with_custom_timeout(PROGRESS_BAR, wait)
            .map_err(|e| anyhow!("Progress bar not rendered: {}", e))?;
        let html = tab
            .get_content()
            .map_err(|e| anyhow!("Could not read page content: {}", e))?;
        Ok(page_extraction(&html, self.window))
    }
}

impl MarkerStrategy for HeatmapSvg {
    fn name(&self) -> &'static str {
        "rendered heatmap"
    }

    fn attempt(&self, session: &PageSession) -> Result<Option<Extraction>> {
        // The heatmap renders lazily, sometimes only after a reload.
        // Each retry reloads the page and doubles its patience.
        let mut attempt = 0u32;
        loop {
            let wait = self.selector_wait * 2u32.saturating_pow(attempt);
            match self.try_once(session, wait) {
                Ok(extraction) => return Ok(extraction),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    debug!(
                        "Heatmap attempt {}/{} failed: {}; reloading",
                        attempt, self.max_retries, e
                    );
                    if let Err(e) = session.reload() {
                        debug!("Reload failed: {}", e);
                    }
                }
                Err(e) => {
                    warn!(
                        "Giving up on rendered heatmap after {} retries: {}",
                        self.max_retries, e
                    );
                    return Ok(None);
                }
            }
        }
    }
}

/// Rebuild markers from the serialized page. Pure so it can be tested
/// against captured markup without a browser.
pub fn page_extraction(html: &str, window: ArtifactWindow) -> Option<Extraction> {
    let document = Html::parse_document(html);

    let progress_selector = Selector::parse(PROGRESS_BAR).ok()?;
    let aria = document
        .select(&progress_selector)
        .next()
        .and_then(|bar| bar.value().attr("aria-valuemax"));
    let video_length_secs = match aria {
        Some(raw) => parse_video_length(raw),
        None => {
            warn!("Progress bar missing or without aria-valuemax, video length unknown");
            None
        }
    };

    let heatmap_selector = Selector::parse(HEATMAP_SVG).ok()?;
    let containers: Vec<_> = document.select(&heatmap_selector).collect();
    if containers.is_empty() {
        return None;
    }
    let markup: String = containers.iter().map(|c| c.html()).collect();

    let fragments = extract_path_fragments(&markup);
    let points = stitch_fragments(&fragments, window);
    let markers = markers_from_points(&points, video_length_secs.unwrap_or(0));

    Some(Extraction {
        heatmap: HeatmapData {
            marker_type: HEATMAP_MARKER_TYPE.to_string(),
            markers,
        },
        video_length_secs,
    })
}

fn parse_video_length(raw: &str) -> Option<u64> {
    match raw.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(secs.round() as u64),
        _ => {
            warn!("Unparseable aria-valuemax '{}', video length unknown", raw);
            None
        }
    }
}

/// Path data attributes from heatmap markup, one per chapter, in
/// document order.
fn extract_path_fragments(markup: &str) -> Vec<String> {
    PATH_DATA_RE
        .captures_iter(markup)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::normalize_markers;
    use crate::ranker::top_replayed_parts;

    /// A 25 point fragment, flat at y=100 except an optional dip.
    fn fragment(dip: Option<(usize, f64)>) -> String {
        (0..25)
            .map(|x| {
                let y = match dip {
                    Some((dx, dy)) if dx == x => dy,
                    _ => 100.0,
                };
                let cmd = if x == 0 { "M" } else { "L" };
                format!("{} {},{}", cmd, x, y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn watch_page(fragments: &[String], aria: Option<&str>) -> String {
        let svgs: String = fragments
            .iter()
            .map(|d| {
                format!(
                    "<div class=\"ytp-heat-map-chapter\">\
                     <svg class=\"ytp-heat-map-svg\" height=\"40\" width=\"1000\">\
                     <path class=\"ytp-heat-map-path\" d=\"{}\"></path>\
                     </svg></div>",
                    d
                )
            })
            .collect();
        let bar = match aria {
            Some(value) => format!(
                "<div class=\"ytp-progress-bar\" role=\"slider\" aria-valuemax=\"{}\"></div>",
                value
            ),
            None => "<div class=\"ytp-progress-bar\" role=\"slider\"></div>".to_string(),
        };
        format!(
            "<html><body><div class=\"ytp-chrome-bottom\">{}{}</div></body></html>",
            svgs, bar
        )
    }

    #[test]
    fn test_two_chapter_page_yields_ranked_peak() {
        let fragments = vec![fragment(None), fragment(Some((16, 20.0)))];
        let page = watch_page(&fragments, Some("100"));

        let extraction = page_extraction(&page, ArtifactWindow::default()).unwrap();
        assert_eq!(extraction.video_length_secs, Some(100));
        // 50 stitched points minus 15 flagged around the joint.
        assert_eq!(extraction.heatmap.markers.len(), 35);

        let normalized = normalize_markers(&extraction.heatmap.markers);
        let parts = top_replayed_parts(&normalized, 1);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].position, 1);
        assert_eq!(parts[0].start, 74);
        assert_eq!(parts[0].end, 77);
    }

    #[test]
    fn test_single_chapter_page_needs_no_stitching() {
        let fragments = vec![fragment(Some((10, 40.0)))];
        let page = watch_page(&fragments, Some("50"));

        let extraction = page_extraction(&page, ArtifactWindow::default()).unwrap();
        assert_eq!(extraction.heatmap.markers.len(), 25);

        let normalized = normalize_markers(&extraction.heatmap.markers);
        let parts = top_replayed_parts(&normalized, 1);
        assert_eq!(parts[0].start, 20);
        assert_eq!(parts[0].end, 22);
    }

    #[test]
    fn test_missing_aria_valuemax_leaves_length_unknown() {
        let fragments = vec![fragment(Some((5, 30.0)))];
        let page = watch_page(&fragments, None);

        let extraction = page_extraction(&page, ArtifactWindow::default()).unwrap();
        assert_eq!(extraction.video_length_secs, None);
        // Intensities survive, only the time axis collapses.
        assert_eq!(extraction.heatmap.markers.len(), 25);
        assert!(extraction.heatmap.markers.iter().all(|m| m.start_millis == 0.0));
    }

    #[test]
    fn test_page_without_heatmap_containers_is_none() {
        let page = watch_page(&[], Some("100"));
        assert!(page_extraction(&page, ArtifactWindow::default()).is_none());
    }

    #[test]
    fn test_container_without_paths_yields_empty_markers() {
        let page = "<html><body>\
                    <svg class=\"ytp-heat-map-svg\"></svg>\
                    <div class=\"ytp-progress-bar\" aria-valuemax=\"90\"></div>\
                    </body></html>";
        let extraction = page_extraction(page, ArtifactWindow::default()).unwrap();
        assert!(extraction.heatmap.markers.is_empty());
        assert_eq!(extraction.video_length_secs, Some(90));
    }

    #[test]
    fn test_fragment_regex_requires_standalone_d_attribute() {
        let markup = "<path stroke-width=\"2\" d=\"M 0,1 L 2,3\"/><path id=\"x\"/>";
        let fragments = extract_path_fragments(markup);
        assert_eq!(fragments, vec!["M 0,1 L 2,3".to_string()]);
    }

    #[test]
    fn test_parse_video_length_handles_fractional_and_garbage() {
        assert_eq!(parse_video_length("212.5"), Some(213));
        assert_eq!(parse_video_length(" 600 "), Some(600));
        assert_eq!(parse_video_length("0"), Some(0));
        assert_eq!(parse_video_length("-5"), None);
        assert_eq!(parse_video_length("NaN"), None);
        assert_eq!(parse_video_length("abc"), None);
    }
}
