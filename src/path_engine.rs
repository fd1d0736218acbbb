//! SVG path geometry for replay heatmaps.
//!
//! The player renders the heatmap as one `<path>` per chapter, each fragment
//! in its own local coordinate space. This module parses those fragments,
//! translates them onto a shared axis and removes the rendering artifacts
//! that appear where fragments meet. No I/O happens here.

use once_cell::sync::Lazy;
use regex::Regex;

/// A point in the heatmap graphic's pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// How many points to excise on each side of a fragment joint.
///
/// The defaults were calibrated against captured player markup; the
/// `[stitch]` config section overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactWindow {
    /// Points removed immediately before a joint.
    pub before: usize,
    /// Points removed immediately after a joint.
    pub after: usize,
}

impl Default for ArtifactWindow {
    fn default() -> Self {
        Self { before: 6, after: 9 }
    }
}

/// One drawing command letter and its argument blob, e.g. `C 1,99 2,98 3,97`.
static PATH_COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z])([^a-zA-Z]*)").unwrap()
});

/// Parse a path `d` string into coordinates.
///
/// Every numeric argument pair becomes a point regardless of the command
/// letter; for the player's heatmap paths the curve control points track the
/// drawn curve closely enough for intensity analysis. Unparseable tokens are
/// skipped and a trailing unpaired number is dropped, so malformed input
/// yields fewer points, never an error.
pub fn parse_path_fragment(fragment: &str) -> Vec<Coordinate> {
    let mut points = Vec::new();
    for command in PATH_COMMAND_RE.captures_iter(fragment) {
        let args: Vec<f64> = command[2]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .filter_map(|token| token.parse::<f64>().ok())
            .collect();
        for pair in args.chunks_exact(2) {
            points.push(Coordinate { x: pair[0], y: pair[1] });
        }
    }
    points
}

/// Stitch path fragments into one continuous point sequence.
///
/// Fragments after the first are translated so they begin exactly where the
/// previous fragment ended; a single fragment comes back unaltered. Each
/// boundary introduces a duplicated point plus a short run of rendering
/// artifacts, which are excised per `window`. The joint point itself is kept
/// so exactly one copy of the boundary survives and the curve stays
/// continuous.
pub fn stitch_fragments(fragments: &[String], window: ArtifactWindow) -> Vec<Coordinate> {
    let mut points: Vec<Coordinate> = Vec::new();
    let mut joints: Vec<usize> = Vec::new();

    for fragment in fragments {
        let parsed = parse_path_fragment(fragment);
        if parsed.is_empty() {
            continue;
        }
        match points.last().copied() {
            None => points.extend(parsed),
            Some(anchor) => {
                let dx = anchor.x - parsed[0].x;
                let dy = anchor.y - parsed[0].y;
                joints.push(points.len());
                // Exact copy rather than a translation: joint detection below
                // relies on the boundary pair comparing bitwise equal.
                points.push(anchor);
                points.extend(
                    parsed[1..]
                        .iter()
                        .map(|p| Coordinate { x: p.x + dx, y: p.y + dy }),
                );
            }
        }
    }

    remove_joint_artifacts(points, &joints, window)
}

/// Excise the artifact window around every joint whose boundary pair is an
/// exact duplicate. Overlapping windows from adjacent joints simply merge.
fn remove_joint_artifacts(
    points: Vec<Coordinate>,
    joints: &[usize],
    window: ArtifactWindow,
) -> Vec<Coordinate> {
    if joints.is_empty() {
        return points;
    }
    let mut excised = vec![false; points.len()];
    for &joint in joints {
        if joint == 0 || joint >= points.len() || points[joint] != points[joint - 1] {
            continue;
        }
        for flag in &mut excised[joint.saturating_sub(window.before)..joint] {
            *flag = true;
        }
        let end = (joint + window.after).min(points.len() - 1);
        for flag in &mut excised[joint + 1..=end] {
            *flag = true;
        }
    }
    points
        .into_iter()
        .zip(excised)
        .filter_map(|(point, gone)| if gone { None } else { Some(point) })
        .collect()
}

/// Render points in the simplified move-then-lines form used for debug
/// output and round-trip tests, e.g. `M 0,100 L 1,98`.
pub fn to_path_data(points: &[Coordinate]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let command = if i == 0 { "M" } else { "L" };
            format!("{} {},{}", command, p.x, p.y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
