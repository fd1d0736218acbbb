//! Extraction from the player data blob embedded in the page.
//!
//! Watch pages ship the player's initial data as a JSON literal inside a
//! script element. The replay heatmap lives under `frameworkUpdates` as a
//! macro markers list with per-bucket intensity scores, so no rendering
//! has to happen at all when the blob is present.

use anyhow::Result;
use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::browser::PageSession;
use crate::config::ExtractionConfig;
use crate::markers::{HeatmapData, RawMarker, HEATMAP_MARKER_TYPE};
use crate::strategy::{Extraction, MarkerStrategy};

/// Quoted key that precedes the player data object we want.
const DATA_MARKER: &str = "\"frameworkUpdates\"";

/// Path from the `frameworkUpdates` object to the mutation array.
const MUTATIONS_PATH: &str = "entityBatchUpdate.mutations";

/// Path from a single mutation to its markers list, when it has one.
const MARKERS_LIST_PATH: &str = "payload.macroMarkersListEntity.markersList";

pub struct EmbeddedMarkers {
    script_wait: Duration,
}

impl EmbeddedMarkers {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            script_wait: Duration::from_secs(config.script_wait_secs),
        }
    }
}

impl MarkerStrategy for EmbeddedMarkers {
    fn name(&self) -> &'static str {
        "embedded player data"
    }

    fn attempt(&self, session: &PageSession) -> Result<Option<Extraction>> {
        let tab = session.tab();
        // Script elements normally exist immediately; a miss here just
        // means we scan whatever the page currently holds.
        if let Err(e) = tab.wait_for_element_with_custom_timeout("script", self.script_wait) {
            debug!("No script elements within {:?}: {}", self.script_wait, e);
        }
        let html = match tab.get_content() {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not read page content: {}", e);
                return Ok(None);
            }
        };
        Ok(scan_page_for_markers(&html))
    }
}

/// Scan every script element for the player data blob and pull the
/// heatmap markers out of the first one that carries them.
pub fn scan_page_for_markers(html: &str) -> Option<Extraction> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        if !text.contains(DATA_MARKER) {
            continue;
        }
        let json = match balanced_json_after(&text, DATA_MARKER) {
            Some(json) => json,
            None => {
                debug!("Marker key present but no balanced object follows it");
                continue;
            }
        };
        let value: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                debug!("Candidate player data does not parse as JSON: {}", e);
                continue;
            }
        };
        if let Some(extraction) = extraction_from_value(&value) {
            return Some(extraction);
        }
    }
    None
}

/// Slice out the balanced JSON object following `marker` in `text`.
///
/// Byte scanner tracking brace depth, string state and escapes. The
/// structural characters are all ASCII, so scanning bytes is safe even
/// though the blob itself contains arbitrary UTF-8.
fn balanced_json_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let key_pos = text.find(marker)?;
    let after = &text[key_pos + marker.len()..];
    let open = after.find('{')?;

    let bytes = after.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for i in open..bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&after[open..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn navigate_json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn extraction_from_value(value: &Value) -> Option<Extraction> {
    let mutations = navigate_json_path(value, MUTATIONS_PATH)?.as_array()?;
    // The markers list is one mutation among several; its index varies
    // between pages, so scan for it.
    let markers_list = mutations
        .iter()
        .find_map(|mutation| navigate_json_path(mutation, MARKERS_LIST_PATH))?;

    let marker_type = markers_list
        .get("markerType")
        .and_then(Value::as_str)
        .unwrap_or(HEATMAP_MARKER_TYPE)
        .to_string();
    let entries = markers_list.get("markers")?.as_array()?;

    let mut markers = Vec::with_capacity(entries.len());
    for entry in entries {
        let start = millis_field(entry, "startMillis");
        let duration = millis_field(entry, "durationMillis");
        let (start_millis, duration_millis) = match (start, duration) {
            (Some(start), Some(duration)) => (start, duration),
            _ => {
                debug!("Skipping marker entry without start/duration");
                continue;
            }
        };
        let intensity_raw = entry
            .get("intensityScoreNormalized")
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN);
        markers.push(RawMarker {
            start_millis,
            duration_millis,
            intensity_raw,
        });
    }

    let span = markers
        .iter()
        .map(|m| m.start_millis + m.duration_millis)
        .fold(0.0_f64, f64::max);
    let video_length_secs = if span.is_finite() && span > 0.0 {
        Some((span / 1000.0).round() as u64)
    } else {
        None
    };

    Some(Extraction {
        heatmap: HeatmapData {
            marker_type,
            markers,
        },
        video_length_secs,
    })
}

/// Marker timestamps arrive as JSON strings on most pages and as bare
/// numbers on some, so accept both.
fn millis_field(entry: &Value, field: &str) -> Option<f64> {
    match entry.get(field)? {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}
