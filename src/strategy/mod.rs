//! Marker extraction strategies.
//!
//! Strategies run in order against an open watch page; the first one that
//! recovers heatmap markers wins. The embedded player data is cheapest and
//! tried first, the rendered SVG is the fallback when the page ships no
//! usable data blob.

pub mod embedded;
pub mod heatmap_svg;

use anyhow::Result;
use tracing::{debug, info};

use crate::browser::PageSession;
use crate::config::AppConfig;
use crate::markers::HeatmapData;

pub use embedded::EmbeddedMarkers;
pub use heatmap_svg::HeatmapSvg;

/// What a strategy recovered from the page.
pub struct Extraction {
    pub heatmap: HeatmapData,
    /// Total video length in seconds, when the source carries it.
    pub video_length_secs: Option<u64>,
}

/// A single way of pulling replay markers out of a watch page.
///
/// `attempt` returns `Ok(None)` when the page simply does not offer this
/// strategy's source (not an error, the next strategy runs), and `Err`
/// only for failures that poison the whole session.
pub trait MarkerStrategy {
    fn name(&self) -> &'static str;
    fn attempt(&self, session: &PageSession) -> Result<Option<Extraction>>;
}

/// Strategies in execution order.
pub fn strategies(config: &AppConfig) -> Vec<Box<dyn MarkerStrategy>> {
    vec![
        Box::new(EmbeddedMarkers::new(&config.extraction)),
        Box::new(HeatmapSvg::new(&config.extraction, &config.stitch)),
    ]
}

/// Run strategies in order, returning the first extraction found.
pub fn run_strategies(
    session: &PageSession,
    strategies: &[Box<dyn MarkerStrategy>],
) -> Result<Option<Extraction>> {
    for strategy in strategies {
        debug!("Trying strategy: {}", strategy.name());
        if let Some(extraction) = strategy.attempt(session)? {
            info!(
                "Strategy {} recovered {} markers",
                strategy.name(),
                extraction.heatmap.markers.len()
            );
            return Ok(Some(extraction));
        }
        debug!("Strategy {} found nothing", strategy.name());
    }
    Ok(None)
}
