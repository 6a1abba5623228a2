use crate::common::*;
use nyaa_mirror::scanner::{build_http_client, discover_newest_id, RangeOptions};
use nyaa_mirror::storage::Storage;
use nyaa_mirror::MirrorError;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn feed(newest: i64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<rss xmlns:atom="http://www.w3.org/2005/Atom" version="2.0">
  <channel>
    <title>Nyaa - Home - Torrent File RSS</title>
    <description>RSS Feed for Home</description>
    <link>https://nyaa.si/</link>
    <item>
      <title>Newest</title>
      <link>https://nyaa.si/download/{newest}.torrent</link>
      <guid isPermaLink="true">https://nyaa.si/view/{newest}</guid>
    </item>
  </channel>
</rss>"#
    )
}

async fn mount_feed(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_discover_newest_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));
    mount_feed(&server, feed(1690012)).await;

    let client = build_http_client(&config.remote).unwrap();
    let newest = discover_newest_id(&client, &config.remote).await.unwrap();

    assert_eq!(newest, 1690012);
}

#[tokio::test]
async fn test_scan_ends_at_discovered_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    mount_feed(&server, feed(2)).await;
    mount_page(&server, 1, VIEW_PAGE).await;
    mount_status(&server, 2, 404).await;

    let options = RangeOptions {
        start: Some(0),
        ..RangeOptions::default()
    };
    let report = run_scan(&config, options).await.unwrap();

    assert_eq!(report.found, 1);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.last_id, Some(2));
}

#[tokio::test]
async fn test_feed_outage_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = run_scan(&config, RangeOptions::default()).await.unwrap_err();
    assert!(matches!(err, MirrorError::Discovery(_)));
    assert_eq!(open(&config).count_posts().unwrap(), 0);
}
