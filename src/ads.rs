//! Pre-roll ad detection and settling.
//!
//! The replay heatmap only renders once the player is showing the actual
//! video, so an ad in progress has to clear before extraction starts.

use headless_chrome::Tab;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::AdsConfig;

const AD_SKIP_BUTTON: &str = ".ytp-ad-skip-button";
const AD_OVERLAY: &str = ".ytp-ad-player-overlay";
const AD_CAPTION: &str = ".ytp-ad-text";

/// True when the player is currently showing an ad.
pub fn has_ad_playing(tab: &Tab) -> bool {
    for selector in [AD_OVERLAY, AD_SKIP_BUTTON, AD_CAPTION] {
        if tab.find_element(selector).is_ok() {
            debug!("Ad element present: {}", selector);
            return true;
        }
    }
    false
}

/// Wait for a running ad to finish, skipping it when the player allows.
///
/// Polls the ad overlay until it disappears or `max_wait` elapses. A stuck
/// overlay is logged and tolerated; extraction proceeds either way.
pub fn wait_for_ad_to_clear(tab: &Tab, config: &AdsConfig) {
    if let Ok(button) = tab.find_element(AD_SKIP_BUTTON) {
        match button.click() {
            Ok(_) => {
                debug!("Clicked ad skip button");
                std::thread::sleep(config.skip_settle());
            }
            Err(e) => debug!("Ad skip button click failed: {}", e),
        }
    }

    if tab.find_element(AD_OVERLAY).is_err() {
        return;
    }

    let started = Instant::now();
    while started.elapsed() < config.max_wait() {
        std::thread::sleep(config.poll_interval());
        if tab.find_element(AD_OVERLAY).is_err() {
            debug!("Ad overlay cleared after {:?}", started.elapsed());
            return;
        }
    }
    warn!(
        "Ad overlay still present after {:?}, proceeding anyway",
        config.max_wait()
    );
}
