// Allow dead code for functions that are part of the API surface but not used in all code paths
#![allow(dead_code)]

use anyhow::Result;
use clap::Parser;

mod ads;
mod browser;
mod cli;
mod config;
mod export;
mod markers;
mod path_engine;
mod pipeline;
mod ranker;
mod strategy;

use cli::Cli;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Handle --init flag first (before any other processing)
    if cli.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run replaypeaks again.");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(message) = cli.validate() {
        eprintln!("❌ {}", message);
        std::process::exit(1);
    }

    // Load configuration
    let app_config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(config::ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config() {
                Ok(Some(created_path)) => {
                    println!(
                        "✅ Created default configuration file at: {}",
                        created_path.display()
                    );
                    println!("   Edit this file to customize settings, then run replaypeaks again.");
                    std::process::exit(0);
                }
                Ok(None) => {
                    eprintln!("❌ Configuration file not found at: {}", path.display());
                    eprintln!("   Run with --init to create a default configuration file.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("❌ Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let input = cli.video.as_deref().unwrap_or_default();
    let video_id = match cli::video_id_from_input(input) {
        Some(id) => id,
        None => {
            eprintln!("❌ Could not find a video id in '{}'", input);
            std::process::exit(1);
        }
    };

    let parts = cli.parts.unwrap_or(app_config.extraction.default_parts);
    let result = pipeline::extract_with_config(&app_config, &video_id, parts).await?;

    match cli.output_format.as_str() {
        "json" => export::export_json(&result, &video_id, &cli.output_path())?,
        "csv" => export::export_csv(&result, &cli.output_path())?,
        _ => export::print_replay_summary(&result, &video_id),
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flags when set
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) => tracing_subscriber::EnvFilter::new(value),
        Err(_) => match verbose {
            0 => tracing_subscriber::EnvFilter::new("replaypeaks=info"),
            1 => tracing_subscriber::EnvFilter::new("replaypeaks=debug"),
            _ => tracing_subscriber::EnvFilter::new("debug"),
        },
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
