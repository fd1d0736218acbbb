//! Configuration management for replaypeaks
//!
//! All configuration is loaded from `./config/replaypeaks.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the
//! embedded config template.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::path_engine::ArtifactWindow;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/replaypeaks.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/replaypeaks.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url} ({reason})")]
    InvalidUrl {
        field: String,
        url: String,
        reason: String,
    },

    #[error("Configuration field '{field}' must be greater than zero")]
    ZeroValue { field: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub browser: BrowserConfig,
    pub ads: AdsConfig,
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub stitch: StitchConfig,
}

/// Where watch pages live. Tests point this at a local server.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Base watch URL; the video id is appended as the `v` query parameter.
    pub watch_url_base: String,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Default timeout for tab operations (seconds)
    pub default_timeout_secs: u64,
}

/// Ad interstitial handling budgets
#[derive(Debug, Clone, Deserialize)]
pub struct AdsConfig {
    /// Total wait for an unskippable overlay to clear (seconds)
    pub max_wait_secs: u64,
    /// Overlay re-check interval while waiting (seconds)
    pub poll_interval_secs: u64,
    /// Pause after clicking a skip control (milliseconds)
    pub skip_settle_millis: u64,
}

impl AdsConfig {
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn skip_settle(&self) -> Duration {
        Duration::from_millis(self.skip_settle_millis)
    }
}

/// Extraction timeouts and retry budget
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Wait for inline script tags before the embedded-data scan (seconds)
    pub script_wait_secs: u64,
    /// Base wait for heatmap and progress-bar elements (seconds)
    pub selector_wait_secs: u64,
    /// Reload-and-retry attempts after the first heatmap extraction try
    pub max_retries: u32,
    /// Segments returned when the caller does not ask for a specific count
    pub default_parts: usize,
}

/// Fragment joint artifact excision window
#[derive(Debug, Clone, Deserialize)]
pub struct StitchConfig {
    #[serde(default = "default_artifact_window_before")]
    pub artifact_window_before: usize,
    #[serde(default = "default_artifact_window_after")]
    pub artifact_window_after: usize,
}

fn default_artifact_window_before() -> usize {
    ArtifactWindow::default().before
}

fn default_artifact_window_after() -> usize {
    ArtifactWindow::default().after
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            artifact_window_before: default_artifact_window_before(),
            artifact_window_after: default_artifact_window_after(),
        }
    }
}

impl StitchConfig {
    pub fn artifact_window(&self) -> ArtifactWindow {
        ArtifactWindow {
            before: self.artifact_window_before,
            after: self.artifact_window_after,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded default configuration, for library use without a config
    /// file on disk. The template is compile-time fixed and covered by tests,
    /// so parsing it cannot fail at runtime.
    pub fn builtin() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default configuration must parse")
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.platform.watch_url_base) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(ConfigError::InvalidUrl {
                    field: "platform.watch_url_base".to_string(),
                    url: self.platform.watch_url_base.clone(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::InvalidUrl {
                    field: "platform.watch_url_base".to_string(),
                    url: self.platform.watch_url_base.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if self.browser.default_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "browser.default_timeout_secs".to_string(),
            });
        }
        if self.ads.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "ads.poll_interval_secs".to_string(),
            });
        }
        if self.extraction.selector_wait_secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "extraction.selector_wait_secs".to_string(),
            });
        }
        if self.extraction.default_parts == 0 {
            return Err(ConfigError::ZeroValue {
                field: "extraction.default_parts".to_string(),
            });
        }

        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write default config
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
