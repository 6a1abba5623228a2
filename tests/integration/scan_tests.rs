use crate::common::*;
use nyaa_mirror::scanner::{
    FetchError, PageFetcher, Pacer, RangeOptions, RangeScheduler, ScanController, ScanOutcome,
};
use nyaa_mirror::storage::Storage;
use nyaa_mirror::MirrorError;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_scan_mixed_statuses() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    mount_page(&server, 1, VIEW_PAGE).await;
    mount_status(&server, 2, 404).await;
    mount_page(&server, 3, VIEW_PAGE).await;

    let report = run_scan(&config, range(0, 3)).await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Done);
    assert_eq!(report.found, 2);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.retries, 0);
    assert_eq!(report.last_id, Some(3));

    let storage = open(&config);
    let post = storage.get_post(1).unwrap().unwrap();
    assert!(!post.deleted);
    assert_eq!(
        post.title.as_deref(),
        Some("[Group] Example Show - 01 [1080p].mkv")
    );
    assert_eq!(post.category.as_deref(), Some("1_2"));
    assert_eq!(post.file_size, Some(1_572_864));
    assert_eq!(post.completed, Some(456));

    let missing = storage.get_post(2).unwrap().unwrap();
    assert!(missing.deleted);
    assert_eq!(missing.title, None);

    let comments = storage.get_comments(1).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, 101);
    assert_eq!(comments[0].edited_date, None);
    assert_eq!(comments[1].id, 102);
    assert!(comments[1].edited_date.is_some());
}

#[tokio::test]
async fn test_rescan_reconciles_comments() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("mirror.db");

    {
        let server = MockServer::start().await;
        let config = create_test_config(&server, &db_path);
        mount_page(&server, 1, VIEW_PAGE).await;
        run_scan(&config, range(0, 1)).await.unwrap();
    }

    let server = MockServer::start().await;
    let config = create_test_config(&server, &db_path);
    mount_page(&server, 1, &view_page_after_edits()).await;
    run_scan(&config, range(0, 1)).await.unwrap();

    let comments = open(&config).get_comments(1).unwrap();
    assert_eq!(comments.len(), 2);

    // Comment 101 vanished upstream
    assert_eq!(comments[0].id, 101);
    assert!(comments[0].deleted);

    // Comment 102 lost its edit marker
    assert_eq!(comments[1].id, 102);
    assert!(!comments[1].deleted);
    assert_eq!(comments[1].edited_date, None);
}

#[tokio::test]
async fn test_resume_after_highest_stored_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    mount_status(&server, 1, 404).await;
    mount_status(&server, 2, 404).await;
    run_scan(&config, range(0, 2)).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/view/3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let options = RangeOptions {
        end: Some(3),
        ..RangeOptions::default()
    };
    let report = run_scan(&config, options).await.unwrap();

    assert_eq!(report.not_found, 1);
    assert_eq!(report.last_id, Some(3));
}

#[tokio::test]
async fn test_transient_failures_retry_same_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    // Two pages that cannot be extracted, then the real one
    Mock::given(method("GET"))
        .and(path("/view/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, 1, VIEW_PAGE).await;

    let report = run_scan(&config, range(0, 1)).await.unwrap();

    // Every counted retry is one `warn!` from the controller's retry arm
    assert_eq!(report.retries, 2);
    assert_eq!(report.found, 1);
    assert_eq!(open(&config).get_comments(1).unwrap().len(), 2);
}

#[tokio::test]
async fn test_timeouts_retry_same_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir.path().join("mirror.db"));
    config.remote.timeout_secs = 1;

    Mock::given(method("GET"))
        .and(path("/view/1"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_secs(3)))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, 1, VIEW_PAGE).await;

    let report = run_scan(&config, range(0, 1)).await.unwrap();

    assert_eq!(report.retries, 2);
    assert_eq!(report.found, 1);
    assert_eq!(report.not_found, 0);

    let storage = open(&config);
    assert_eq!(storage.count_posts().unwrap(), 1);
    assert!(!storage.get_post(1).unwrap().unwrap().deleted);
}

#[tokio::test]
async fn test_unexpected_status_stops_scan() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    mount_page(&server, 1, VIEW_PAGE).await;
    mount_status(&server, 2, 429).await;
    Mock::given(method("GET"))
        .and(path("/view/3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let err = run_scan(&config, range(0, 3)).await.unwrap_err();
    assert!(matches!(
        err,
        MirrorError::Fetch(FetchError::UnexpectedStatus { id: 2, status: 429 })
    ));

    let storage = open(&config);
    assert!(storage.post_exists(1).unwrap());
    assert!(!storage.post_exists(2).unwrap());
    assert_eq!(storage.max_stored_id().unwrap(), Some(1));
}

#[tokio::test]
async fn test_skip_existing_ids() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    mount_status(&server, 2, 404).await;
    run_scan(&config, range(1, 2)).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/view/1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/view/3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let options = RangeOptions {
        skip_existing: true,
        ..range(0, 3)
    };
    let report = run_scan(&config, options).await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.not_found, 2);
}

#[tokio::test]
async fn test_continue_in_range_skips_to_watermark() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    // A previous run got through 11..=13 of the window before stopping
    for id in 11..=13 {
        mount_status(&server, id, 404).await;
    }
    run_scan(&config, range(10, 13)).await.unwrap();

    for id in 14..=15 {
        Mock::given(method("GET"))
            .and(path(format!("/view/{}", id)))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
    }

    let options = RangeOptions {
        continue_in_range: true,
        ..range(10, 15)
    };
    let report = run_scan(&config, options).await.unwrap();

    assert_eq!(report.not_found, 2);
    assert_eq!(report.last_id, Some(15));
}

#[tokio::test]
async fn test_cancelled_scan_leaves_store_untouched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let options = range(0, 5);
    let mut controller = ScanController::new(
        open(&config),
        PageFetcher::new(&config).unwrap(),
        RangeScheduler::new(options),
        Pacer::new(&config.pacing),
    );
    let scan_range = controller.plan(None).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = controller.run(&scan_range, &cancel).await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Cancelled);
    assert_eq!(controller.into_storage().count_posts().unwrap(), 0);
}

#[tokio::test]
async fn test_cancel_during_fetch_finishes_current_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir.path().join("mirror.db"));

    Mock::given(method("GET"))
        .and(path("/view/1"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(800)))
        .expect(1)
        .mount(&server)
        .await;
    for id in 2..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/view/{}", id)))
            .respond_with(ResponseTemplate::new(404))
            .expect(0)
            .mount(&server)
            .await;
    }

    let options = range(0, 5);
    let mut controller = ScanController::new(
        open(&config),
        PageFetcher::new(&config).unwrap(),
        RangeScheduler::new(options),
        Pacer::new(&config.pacing),
    );
    let scan_range = controller.plan(None).unwrap();

    // Fires while the request for ID 1 is still waiting on the server
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let report = controller.run(&scan_range, &cancel).await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Cancelled);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.last_id, Some(1));

    let storage = controller.into_storage();
    assert_eq!(storage.max_stored_id().unwrap(), Some(1));
    assert!(storage.get_post(1).unwrap().unwrap().deleted);
}
