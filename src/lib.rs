// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod ads;
pub mod browser;
pub mod cli;
pub mod config;
pub mod export;
pub mod markers;
pub mod path_engine;
pub mod pipeline;
pub mod ranker;
pub mod strategy;

pub use config::AppConfig;
pub use markers::{HeatmapData, NormalizedMarker, RawMarker};
pub use path_engine::{ArtifactWindow, Coordinate};
pub use pipeline::{extract, extract_with_config, ExtractionResult};
pub use ranker::ReplayedPart;
