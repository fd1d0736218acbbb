//! Headless Chrome session plumbing.
//!
//! One browser process per extraction. The session owns the process, so
//! dropping it (on success, error or caller cancellation) kills Chrome;
//! nothing here outlives an extraction call.

use anyhow::{anyhow, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::AppConfig;

/// Create a headless Chrome browser instance.
/// Automatically disables sandbox when running inside a container
/// (detected via /.dockerenv or REPLAYPEAKS_CONTAINER env var) and honors
/// a CHROME_PATH override for the binary location.
pub fn create_browser() -> Result<Browser> {
    let is_container = std::env::var("REPLAYPEAKS_CONTAINER").is_ok()
        || std::path::Path::new("/.dockerenv").exists();

    let chrome_path = std::env::var("CHROME_PATH")
        .ok()
        .map(std::path::PathBuf::from);

    // Assign a unique debug port per browser instance so concurrent
    // extractions do not collide. Counter starts at Chrome's default
    // debug port and wraps within a small range.
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(9222);
    let debug_port = PORT_COUNTER.fetch_add(1, Ordering::Relaxed);
    if debug_port > 9322 {
        PORT_COUNTER.store(9222, Ordering::Relaxed);
    }

    let mut builder = LaunchOptions::default_builder();
    builder.port(Some(debug_port));
    if is_container {
        builder.sandbox(false);
    }
    if let Some(path) = chrome_path {
        builder.path(Some(path));
    }
    let options = builder
        .build()
        .map_err(|e| anyhow!("Failed to build Chrome launch options: {}", e))?;

    Browser::new(options).map_err(|e| anyhow!("Failed to launch headless Chrome: {}", e))
}

/// An open tab on a video's watch page.
pub struct PageSession {
    // Held for its Drop: killing the browser tears down the tab too.
    _browser: Browser,
    tab: Arc<Tab>,
    video_id: String,
}

impl PageSession {
    /// Launch a browser and navigate to the watch page for `video_id`.
    pub fn open(config: &AppConfig, video_id: &str) -> Result<Self> {
        let browser = create_browser()?;
        let tab = browser
            .new_tab()
            .map_err(|e| anyhow!("Failed to create tab: {}", e))?;
        tab.set_default_timeout(Duration::from_secs(config.browser.default_timeout_secs));

        let url = watch_url(&config.platform.watch_url_base, video_id)?;
        debug!("Navigating to {}", url);
        tab.navigate_to(url.as_str())
            .map_err(|e| anyhow!("Navigation to {} failed: {}", url, e))?;
        tab.wait_until_navigated()
            .map_err(|e| anyhow!("Page load failed for {}: {}", url, e))?;

        Ok(Self {
            _browser: browser,
            tab,
            video_id: video_id.to_string(),
        })
    }

    pub fn tab(&self) -> &Tab {
        &self.tab
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Reload the page, used between extraction retries.
    pub fn reload(&self) -> Result<()> {
        self.tab
            .reload(false, None)
            .map_err(|e| anyhow!("Page reload failed: {}", e))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| anyhow!("Page load failed after reload: {}", e))?;
        Ok(())
    }
}

/// Build the watch URL for a video id.
fn watch_url(base: &str, video_id: &str) -> Result<Url> {
    Url::parse_with_params(base, &[("v", video_id)])
        .map_err(|e| anyhow!("Invalid watch URL base '{}': {}", base, e))
}
