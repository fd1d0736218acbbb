use clap::Parser;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "replaypeaks")]
#[command(about = "Finds the most replayed parts of a YouTube video from the player's replay heatmap")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/replaypeaks.toml
    #[arg(long)]
    pub init: bool,

    /// Video to analyze: a video id or any watch/share/shorts/embed URL
    #[arg(short = 'i', long, value_name = "ID_OR_URL")]
    pub video: Option<String>,

    /// Number of most replayed parts to report (default from config)
    #[arg(short, long, value_name = "N")]
    pub parts: Option<usize>,

    /// Output format: 'table' (default), 'json', or 'csv'
    #[arg(short = 'f', long, default_value = "table")]
    pub output_format: String,

    /// Output file for json/csv (extension will be set based on format if not provided)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Verbose logging (use -v for DEBUG, -vv for TRACE with protocol details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        // Video validation only applies when not using --init
        if !self.init {
            match &self.video {
                None => {
                    return Err("A video is required (use --video with an id or URL)".to_string())
                }
                Some(v) if v.trim().is_empty() => {
                    return Err("Video cannot be empty".to_string())
                }
                _ => {}
            }
        }

        if !["table", "json", "csv"].contains(&self.output_format.as_str()) {
            return Err("Output format must be 'table', 'json', or 'csv'".to_string());
        }

        if let Some(parts) = self.parts {
            if parts == 0 {
                return Err("Parts must be greater than 0".to_string());
            }
        }

        Ok(())
    }

    /// Output file path for json/csv formats.
    pub fn output_path(&self) -> String {
        let base = self
            .output
            .clone()
            .unwrap_or_else(|| "replay_parts".to_string());
        if std::path::Path::new(&base).extension().is_some() {
            base
        } else {
            format!("{}.{}", base, self.output_format)
        }
    }
}

/// Pull a video id out of whatever the user handed us: a bare id, a watch
/// URL (desktop, mobile or music), a youtu.be share link, or a
/// shorts/embed/live URL.
pub fn video_id_from_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.contains("://") && !trimmed.contains('/') {
        return Some(trimmed.to_string());
    }

    let url = Url::parse(trimmed).ok()?;
    let host = url.host_str()?;
    let host = host.trim_start_matches("www.").trim_start_matches("m.");

    match host {
        "youtu.be" => url
            .path_segments()?
            .next()
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_string()),
        "youtube.com" | "music.youtube.com" => {
            if url.path() == "/watch" {
                url.query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| !value.is_empty())
            } else {
                let mut segments = url.path_segments()?;
                match segments.next()? {
                    "shorts" | "embed" | "live" => segments
                        .next()
                        .filter(|segment| !segment.is_empty())
                        .map(|segment| segment.to_string()),
                    _ => None,
                }
            }
        }
        _ => None,
    }
}
