use nyaa_mirror::config::{Config, PacingConfig};
use nyaa_mirror::scanner::{scan, RangeOptions, ScanReport};
use nyaa_mirror::storage::SqliteStorage;
use nyaa_mirror::MirrorError;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VIEW_PAGE: &str = include_str!("../fixtures/view_page.html");

/// Creates a test configuration pointing at the mock server, with no pacing
pub fn create_test_config(server: &MockServer, db_path: &Path) -> Config {
    let mut config = Config::default();
    config.remote.scheme = "http".to_string();
    config.remote.domain = server.address().to_string();
    config.remote.timeout_secs = 5;
    config.pacing = PacingConfig {
        base_delay_ms: 0,
        jitter_ms: 0,
    };
    config.output.database_path = db_path.display().to_string();
    config
}

/// The fixture page without comment 101 and with comment 102 no longer edited
pub fn view_page_after_edits() -> String {
    let first = VIEW_PAGE
        .find(r#"<div class="panel panel-default comment-panel" id="com-1">"#)
        .unwrap();
    let second = VIEW_PAGE
        .find(r#"<div class="panel panel-default comment-panel" id="com-2">"#)
        .unwrap();

    let mut page = String::new();
    page.push_str(&VIEW_PAGE[..first]);
    page.push_str(&VIEW_PAGE[second..]);
    page.replace(
        r#"<small data-timestamp-swap data-timestamp="1663317015" title="2022-09-16 08:30:15">(edited)</small>"#,
        "",
    )
}

pub async fn mount_page(server: &MockServer, id: i64, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/view/{}", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, id: i64, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/view/{}", id)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Runs a scan of `(start, end]` against a fresh handle on the database
pub async fn run_scan(
    config: &Config,
    options: RangeOptions,
) -> Result<ScanReport, MirrorError> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    scan(config, storage, options, &CancellationToken::new()).await
}

pub fn range(start: i64, end: i64) -> RangeOptions {
    RangeOptions {
        start: Some(start),
        end: Some(end),
        ..RangeOptions::default()
    }
}

pub fn open(config: &Config) -> SqliteStorage {
    SqliteStorage::new(Path::new(&config.output.database_path)).unwrap()
}
