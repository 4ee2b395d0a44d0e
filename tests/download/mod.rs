//! Integration tests for the download pipeline
//!
//! These drive the coordinator end to end: a local mock server serves both
//! the manifest and the video files, and the tests check what lands in the
//! output directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use url::Url;

use aerial_fetcher::app::{
    AerialClient, Coordinator, DownloadOutcome, DownloadRequest, ProgressEvent, RunOutcome,
    SchedulerConfig, SkipReason, VideoQuality,
};

fn coordinator(parallelism: i64) -> Coordinator {
    Coordinator::new(
        Arc::new(AerialClient::new().unwrap()),
        SchedulerConfig::new(parallelism),
    )
}

fn manifest_url(server: &mockito::Server) -> Url {
    Url::parse(&format!("{}/entries.json", server.url())).unwrap()
}

fn finished(outcome: RunOutcome) -> aerial_fetcher::app::RunResult {
    match outcome {
        RunOutcome::Finished(result) => result,
        other => panic!("expected a finished run, got {:?}", other),
    }
}

/// Test a legacy manifest downloads into a fresh directory
///
/// The single video is tagged SDR1080, so the default quality selects it
/// and the file is named after the last URL segment.
#[tokio::test]
async fn test_legacy_manifest_downloads_file() {
    let mut server = mockito::Server::new_async().await;
    let manifest = format!(
        r#"[{{"id":"g1","assets":[{{"id":"a","url":"{}/a.mov","type":"video","timeOfDay":"day"}}]}}]"#,
        server.url()
    );
    let _manifest = server
        .mock("GET", "/entries.json")
        .with_body(manifest)
        .create_async()
        .await;
    let _video = server
        .mock("GET", "/a.mov")
        .with_body("aerial-bytes")
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let request = DownloadRequest::new(manifest_url(&server), temp_dir.path());

    let outcome = coordinator(1)
        .run(&request, &CancellationToken::new(), None)
        .await
        .unwrap();
    let result = finished(outcome);

    assert!(!result.any_failure);
    assert_eq!(result.completed, 1);
    assert_eq!(
        std::fs::read(temp_dir.path().join("a.mov")).unwrap(),
        b"aerial-bytes"
    );
}

/// Test that versioned manifests are filtered by quality
///
/// Only the HDR4K request finds the video; SDR1080 ends with no matching
/// videos, which is a successful outcome.
#[tokio::test]
async fn test_versioned_manifest_quality_filter() {
    let mut server = mockito::Server::new_async().await;
    let manifest = format!(
        r#"{{"version":1,"assets":[{{"id":"v1","accessibilityLabel":"L","url-4K-HDR":"{}/b.mov"}}]}}"#,
        server.url()
    );
    let _manifest = server
        .mock("GET", "/entries.json")
        .with_body(manifest)
        .expect_at_least(2)
        .create_async()
        .await;
    let _video = server
        .mock("GET", "/b.mov")
        .with_body("hdr")
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let token = CancellationToken::new();

    let request =
        DownloadRequest::new(manifest_url(&server), temp_dir.path()).with_quality(VideoQuality::SDR1080);
    let outcome = coordinator(1).run(&request, &token, None).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoMatchingVideos { videos: 1 }));
    assert_eq!(outcome.exit_code(), 0);
    assert!(!temp_dir.path().join("b.mov").exists());

    let request =
        DownloadRequest::new(manifest_url(&server), temp_dir.path()).with_quality(VideoQuality::HDR4K);
    let result = finished(coordinator(1).run(&request, &token, None).await.unwrap());
    assert_eq!(result.completed, 1);
    assert_eq!(std::fs::read(temp_dir.path().join("b.mov")).unwrap(), b"hdr");
}

/// Test that an existing file is left untouched when overwrite is disabled
#[tokio::test]
async fn test_existing_file_skipped_without_overwrite() {
    let mut server = mockito::Server::new_async().await;
    let manifest = format!(
        r#"[{{"id":"g1","assets":[{{"id":"a","url":"{}/a.mov","type":"video"}}]}}]"#,
        server.url()
    );
    let _manifest = server
        .mock("GET", "/entries.json")
        .with_body(manifest)
        .create_async()
        .await;
    let video = server
        .mock("GET", "/a.mov")
        .with_body("fresh")
        .expect(0)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("a.mov"), b"stale").unwrap();

    let request = DownloadRequest::new(manifest_url(&server), temp_dir.path());
    let result = finished(
        coordinator(1)
            .run(&request, &CancellationToken::new(), None)
            .await
            .unwrap(),
    );

    assert!(!result.any_failure);
    assert_eq!(result.skipped, 1);
    assert_eq!(
        result.reports[0].outcome,
        DownloadOutcome::Skipped(SkipReason::AlreadyExists)
    );
    assert_eq!(std::fs::read(temp_dir.path().join("a.mov")).unwrap(), b"stale");
    video.assert_async().await;
}

/// Test the length-based resume check with overwrite enabled
///
/// A file of the same length as the remote body is skipped; a shorter one
/// is replaced.
#[tokio::test]
async fn test_overwrite_compares_lengths() {
    let mut server = mockito::Server::new_async().await;
    let manifest = format!(
        r#"[{{"id":"g1","assets":[
            {{"id":"a","url":"{0}/a.mov","type":"video"}},
            {{"id":"b","url":"{0}/b.mov","type":"video"}}
        ]}}]"#,
        server.url()
    );
    let _manifest = server
        .mock("GET", "/entries.json")
        .with_body(manifest)
        .create_async()
        .await;
    let _a = server
        .mock("GET", "/a.mov")
        .with_body("12345")
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/b.mov")
        .with_body("abcdef")
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("a.mov"), b"xxxxx").unwrap();
    std::fs::write(temp_dir.path().join("b.mov"), b"ab").unwrap();

    let request = DownloadRequest::new(manifest_url(&server), temp_dir.path()).with_overwrite(true);
    let result = finished(
        coordinator(2)
            .run(&request, &CancellationToken::new(), None)
            .await
            .unwrap(),
    );

    assert!(!result.any_failure);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.completed, 1);
    assert_eq!(std::fs::read(temp_dir.path().join("a.mov")).unwrap(), b"xxxxx");
    assert_eq!(std::fs::read(temp_dir.path().join("b.mov")).unwrap(), b"abcdef");
}

/// Test that one broken video does not stop the others
///
/// Progress events are streamed for every item, including the failure.
#[tokio::test]
async fn test_failed_item_reported_and_isolated() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut server = mockito::Server::new_async().await;
    let manifest = format!(
        r#"{{"version":"1","assets":[
            {{"id":"v1","accessibilityLabel":"Coast","url-1080-SDR":"{0}/coast.mov"}},
            {{"id":"v2","accessibilityLabel":"Desert","url-1080-SDR":"http://127.0.0.1:{1}/desert.mov"}}
        ]}}"#,
        server.url(),
        dead_port
    );
    let _manifest = server
        .mock("GET", "/entries.json")
        .with_body(manifest)
        .create_async()
        .await;
    let _coast = server
        .mock("GET", "/coast.mov")
        .with_body("coast")
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let request = DownloadRequest::new(manifest_url(&server), temp_dir.path());
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);

    let outcome = coordinator(2)
        .run(&request, &CancellationToken::new(), Some(tx))
        .await
        .unwrap();
    assert_eq!(outcome.exit_code(), 1);

    let result = finished(outcome);
    assert!(result.any_failure);
    assert_eq!(result.completed, 1);
    assert_eq!(result.failed, 1);
    assert!(temp_dir.path().join("coast.mov").exists());
    assert!(!temp_dir.path().join("desert.mov").exists());

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Failed { url, .. } if url.ends_with("/desert.mov"))));
}

/// Server whose responses advertise a large body, send a few bytes, then stall
async fn stalling_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000000\r\n\r\npartial")
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    format!("http://{}", address)
}

async fn wait_for_file(path: &Path) -> bool {
    for _ in 0..500 {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Test cancellation in the middle of a transfer
///
/// The run ends as cancelled without any failure, and the partially written
/// file is removed.
#[tokio::test]
async fn test_cancel_mid_transfer_removes_partial_file() {
    let stalling = stalling_server().await;

    let mut server = mockito::Server::new_async().await;
    let manifest = format!(
        r#"[{{"id":"g1","assets":[{{"id":"a","url":"{}/big.mov","type":"video"}}]}}]"#,
        stalling
    );
    let _manifest = server
        .mock("GET", "/entries.json")
        .with_body(manifest)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let partial = temp_dir.path().join("big.mov");
    let request = DownloadRequest::new(manifest_url(&server), temp_dir.path());
    let token = CancellationToken::new();

    let run = {
        let token = token.clone();
        let coordinator = coordinator(1);
        tokio::spawn(async move { coordinator.run(&request, &token, None).await })
    };

    assert!(wait_for_file(&partial).await);
    token.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let result = finished(outcome);

    assert!(result.cancelled);
    assert!(!result.any_failure);
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.reports[0].outcome, DownloadOutcome::Cancelled);
    assert!(!partial.exists());
}
