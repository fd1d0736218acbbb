#![allow(dead_code)]

use std::path::PathBuf;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use replaypeaks::config::{
    AdsConfig, AppConfig, BrowserConfig, ExtractionConfig, PlatformConfig, StitchConfig,
};

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn load_fixture(relative: &str) -> String {
    std::fs::read_to_string(fixture_path(relative))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", relative))
}

/// Starts a mock server that serves `html` as the watch page for `video_id`.
///
/// The server responds to GET requests at `/watch` with the `v` query
/// parameter matching the provided id, the same shape the real watch URL
/// takes.
pub async fn mock_watch_page(video_id: &str, html: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", video_id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    server
}

/// Configuration pointed at a mock server, with timeouts tightened so the
/// browser scenarios finish quickly.
pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        platform: PlatformConfig {
            watch_url_base: format!("{}/watch", server.uri()),
        },
        browser: BrowserConfig {
            default_timeout_secs: 10,
        },
        ads: AdsConfig {
            max_wait_secs: 6,
            poll_interval_secs: 1,
            skip_settle_millis: 200,
        },
        extraction: ExtractionConfig {
            script_wait_secs: 2,
            selector_wait_secs: 2,
            max_retries: 1,
            default_parts: 150,
        },
        stitch: StitchConfig {
            artifact_window_before: 6,
            artifact_window_after: 9,
        },
    }
}
