//! Scheduler tests against local HTTP servers
//!
//! Covers failure isolation, the aggregate failure flag, cancellation of
//! queued and in-flight items, and progress reporting.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::app::client::{AerialClient, SkipReason};

fn scheduler(parallelism: i64) -> DownloadScheduler {
    let client = Arc::new(AerialClient::new().unwrap());
    DownloadScheduler::new(SchedulerConfig::new(parallelism), client).unwrap()
}

/// URL on a port where nothing is listening
fn unreachable_url(name: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/{}", port, name)
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

async fn wait_for_files(dir: &Path, names: &[&str]) -> bool {
    for _ in 0..500 {
        if names.iter().all(|name| dir.join(name).exists()) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Test that a failing item does not abort its siblings
///
/// One URL is unreachable, the others download; the run reports a failure
/// but every other file is written.
#[tokio::test]
async fn test_failure_isolation() {
    let mut server = mockito::Server::new_async().await;
    let _a = server
        .mock("GET", "/a.mov")
        .with_body("aaaa")
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/b.mov")
        .with_body("bbbbbb")
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let urls = vec![
        format!("{}/a.mov", server.url()),
        unreachable_url("broken.mov"),
        format!("{}/b.mov", server.url()),
    ];

    let result = scheduler(2)
        .run(
            DownloadBatch::new(urls, temp_dir.path()),
            &CancellationToken::new(),
            None,
        )
        .await;

    assert!(result.any_failure);
    assert_eq!(result.exit_code(), 1);
    assert_eq!(result.submitted, 3);
    assert_eq!(result.attempted, 3);
    assert_eq!(result.completed, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.bytes_downloaded, 10);
    assert!(!result.cancelled);

    let failures: Vec<_> = result.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].0.ends_with("/broken.mov"));

    assert_eq!(std::fs::read(temp_dir.path().join("a.mov")).unwrap(), b"aaaa");
    assert_eq!(std::fs::read(temp_dir.path().join("b.mov")).unwrap(), b"bbbbbb");
    assert!(!temp_dir.path().join("broken.mov").exists());
}

/// Test that skips and completions alone never set the failure flag
#[tokio::test]
async fn test_no_failure_when_all_skipped_or_completed() {
    let mut server = mockito::Server::new_async().await;
    let _a = server
        .mock("GET", "/a.mov")
        .with_body("12345")
        .create_async()
        .await;
    let _gone = server
        .mock("GET", "/gone.mov")
        .with_status(404)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("kept.mov"), b"local").unwrap();

    let urls = vec![
        format!("{}/a.mov", server.url()),
        format!("{}/gone.mov", server.url()),
        format!("{}/kept.mov", server.url()),
        format!("{}/folder/", server.url()),
    ];

    let result = scheduler(4)
        .run(
            DownloadBatch::new(urls, temp_dir.path()),
            &CancellationToken::new(),
            None,
        )
        .await;

    assert!(!result.any_failure);
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.completed, 1);
    assert_eq!(result.skipped, 3);

    let reasons: Vec<_> = result
        .reports
        .iter()
        .filter_map(|report| match report.outcome {
            DownloadOutcome::Skipped(reason) => Some(reason),
            _ => None,
        })
        .collect();
    assert!(reasons.contains(&SkipReason::AlreadyExists));
    assert!(reasons.contains(&SkipReason::InvalidUrl));
    assert!(reasons.contains(&SkipReason::Unavailable { status: 404 }));
}

/// Test that an empty batch finishes immediately
#[tokio::test]
async fn test_empty_batch() {
    let temp_dir = TempDir::new().unwrap();

    let result = scheduler(3)
        .run(
            DownloadBatch::new(Vec::new(), temp_dir.path()),
            &CancellationToken::new(),
            None,
        )
        .await;

    assert_eq!(result.submitted, 0);
    assert!(result.reports.is_empty());
    assert!(!result.any_failure);
}

/// Test that queued items are abandoned when cancelled before the run
#[tokio::test]
async fn test_cancelled_before_start_abandons_queue() {
    let temp_dir = TempDir::new().unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let urls = vec![unreachable_url("a.mov"), unreachable_url("b.mov")];
    let result = scheduler(1)
        .run(DownloadBatch::new(urls, temp_dir.path()), &token, None)
        .await;

    assert!(result.cancelled);
    assert!(!result.any_failure);
    assert_eq!(result.attempted, 0);
    assert_eq!(result.cancelled_items, 2);
    assert!(result.reports.iter().all(|r| r.worker_id.is_none()));
}

/// Test cancellation with transfers in flight and items still queued
///
/// With one worker and three stalled URLs, the first is in flight when the
/// token fires; it ends cancelled and its partial file is removed, and the
/// other two are never started.
#[tokio::test]
async fn test_cancel_mid_run() {
    let base = stalling_server().await;
    let temp_dir = TempDir::new().unwrap();
    let token = CancellationToken::new();

    let urls = vec![
        format!("{}/one.mov", base),
        format!("{}/two.mov", base),
        format!("{}/three.mov", base),
    ];

    let run = {
        let scheduler = scheduler(1);
        let batch = DownloadBatch::new(urls, temp_dir.path());
        let token = token.clone();
        tokio::spawn(async move { scheduler.run(batch, &token, None).await })
    };

    assert!(wait_for_files(temp_dir.path(), &["one.mov"]).await);
    token.cancel();
    let result = run.await.unwrap();

    assert!(result.cancelled);
    assert!(!result.any_failure);
    assert_eq!(result.attempted, 1);
    assert_eq!(result.cancelled_items, 3);
    assert!(!temp_dir.path().join("one.mov").exists());
    assert!(!temp_dir.path().join("two.mov").exists());
}

/// Test that up to N transfers are in flight at once
#[tokio::test]
async fn test_parallel_transfers() {
    let base = stalling_server().await;
    let temp_dir = TempDir::new().unwrap();
    let token = CancellationToken::new();

    let urls = vec![format!("{}/x.mov", base), format!("{}/y.mov", base)];

    let run = {
        let scheduler = scheduler(2);
        let batch = DownloadBatch::new(urls, temp_dir.path());
        let token = token.clone();
        tokio::spawn(async move { scheduler.run(batch, &token, None).await })
    };

    // Both files only exist together if both transfers run concurrently
    assert!(wait_for_files(temp_dir.path(), &["x.mov", "y.mov"]).await);
    token.cancel();
    let result = run.await.unwrap();

    assert_eq!(result.attempted, 2);
    assert_eq!(result.cancelled_items, 2);
    assert!(!temp_dir.path().join("x.mov").exists());
    assert!(!temp_dir.path().join("y.mov").exists());
}

/// Test that one progress event is emitted per submitted item
#[tokio::test]
async fn test_progress_events() {
    let mut server = mockito::Server::new_async().await;
    let _a = server
        .mock("GET", "/a.mov")
        .with_body("abc")
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let scheduler = scheduler(1);
    let (progress_tx, mut progress_rx) = scheduler.progress_channel();

    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = progress_rx.recv().await {
            events.push(event);
        }
        events
    });

    let urls = vec![
        format!("{}/a.mov", server.url()),
        unreachable_url("b.mov"),
    ];
    let result = scheduler
        .run(
            DownloadBatch::new(urls, temp_dir.path()),
            &CancellationToken::new(),
            Some(progress_tx),
        )
        .await;
    let events = collector.await.unwrap();

    assert_eq!(events.len(), result.submitted);
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Completed { bytes: 3, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Failed { url, .. } if url.ends_with("/b.mov"))));
}
