//! End-to-end extraction pipeline.
//!
//! Opens the watch page, lets any pre-roll ad clear, runs the marker
//! strategies and ranks whatever they recovered.

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::ads;
use crate::browser::PageSession;
use crate::config::AppConfig;
use crate::markers::normalize_markers;
use crate::ranker::{top_replayed_parts, ReplayedPart};
use crate::strategy::{self, Extraction};

/// The outcome of one extraction.
#[derive(Debug, Serialize)]
pub struct ExtractionResult {
    pub replayed_parts: Vec<ReplayedPart>,
    /// Video length in seconds, when a source exposed it.
    pub video_length: Option<u64>,
}

/// Extract the most-replayed parts of a video using built-in defaults.
pub async fn extract(video_id: &str, requested_segment_count: usize) -> Result<ExtractionResult> {
    extract_with_config(&AppConfig::builtin(), video_id, requested_segment_count).await
}

/// Extract the most-replayed parts of a video.
///
/// The browser work is synchronous, so it runs on a blocking thread. The
/// session (and its Chrome process) lives inside that closure, which means
/// it is dropped and torn down on every exit path, including the caller
/// cancelling this future.
pub async fn extract_with_config(
    config: &AppConfig,
    video_id: &str,
    requested_segment_count: usize,
) -> Result<ExtractionResult> {
    if video_id.trim().is_empty() {
        return Err(anyhow!("video id must not be empty"));
    }

    let config = config.clone();
    let video_id = video_id.to_string();
    let handle = tokio::task::spawn_blocking(move || -> Result<ExtractionResult> {
        run_extraction(&config, &video_id, requested_segment_count)
    });

    handle
        .await
        .map_err(|e| anyhow!("Extraction task panicked: {}", e))?
}

fn run_extraction(
    config: &AppConfig,
    video_id: &str,
    requested_segment_count: usize,
) -> Result<ExtractionResult> {
    info!("Extracting replay heatmap for video {}", video_id);
    let session = PageSession::open(config, video_id)?;

    if ads::has_ad_playing(session.tab()) {
        info!("Ad playing on {}, waiting for it to clear", video_id);
        ads::wait_for_ad_to_clear(session.tab(), &config.ads);
    }

    let strategies = strategy::strategies(config);
    let extraction = strategy::run_strategies(&session, &strategies)?;
    Ok(assemble_result(extraction, requested_segment_count))
}

fn assemble_result(extraction: Option<Extraction>, count: usize) -> ExtractionResult {
    match extraction {
        Some(extraction) => {
            debug!(
                "Ranking {} markers of type {}",
                extraction.heatmap.markers.len(),
                extraction.heatmap.marker_type
            );
            let normalized = normalize_markers(&extraction.heatmap.markers);
            ExtractionResult {
                replayed_parts: top_replayed_parts(&normalized, count),
                video_length: extraction.video_length_secs,
            }
        }
        None => {
            info!("No strategy produced replay markers");
            ExtractionResult {
                replayed_parts: Vec::new(),
                video_length: None,
            }
        }
    }
}
