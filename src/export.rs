use crate::pipeline::ExtractionResult;
use crate::ranker::ReplayedPart;
use anyhow::Result;
use chrono::Utc;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

pub fn export_csv(result: &ExtractionResult, output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} replayed parts to CSV: {}",
        result.replayed_parts.len(),
        output_path
    );

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(["Position", "Start Seconds", "End Seconds"])?;

    for part in &result.replayed_parts {
        wtr.write_record([
            part.position.to_string(),
            part.start.to_string(),
            part.end.to_string(),
        ])?;
    }

    wtr.flush()?;
    info!(
        "Successfully exported {} replayed parts to CSV: {}",
        result.replayed_parts.len(),
        output_path
    );

    Ok(())
}

pub fn export_json(result: &ExtractionResult, video_id: &str, output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} replayed parts to JSON: {}",
        result.replayed_parts.len(),
        output_path
    );

    let json_output = JsonExport {
        video_id: video_id.to_string(),
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        video_length: result.video_length,
        replayed_parts: result.replayed_parts.clone(),
    };

    let json_string = serde_json::to_string_pretty(&json_output)?;

    let mut file = File::create(output_path)?;
    file.write_all(json_string.as_bytes())?;

    info!(
        "Successfully exported {} replayed parts to JSON: {}",
        result.replayed_parts.len(),
        output_path
    );

    Ok(())
}

#[derive(serde::Serialize)]
struct JsonExport {
    video_id: String,
    generated_at: String,
    video_length: Option<u64>,
    replayed_parts: Vec<ReplayedPart>,
}

pub fn print_replay_summary(result: &ExtractionResult, video_id: &str) {
    if result.replayed_parts.is_empty() {
        println!("No replay heatmap available for {}.", video_id);
        return;
    }

    println!("\n=== Most Replayed Parts: {} ===", video_id);
    if let Some(length) = result.video_length {
        println!("Video length: {}", format_timestamp(length));
    }
    println!("{:>4}  {:>9}  {:>9}", "#", "Start", "End");
    for part in &result.replayed_parts {
        println!(
            "{:>4}  {:>9}  {:>9}",
            part.position,
            format_timestamp(part.start),
            format_timestamp(part.end)
        );
    }
    println!("===============================\n");
}

fn format_timestamp(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
