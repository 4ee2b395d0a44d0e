//! Progress display for download runs
//!
//! The scheduler streams one [`ProgressEvent`] per finished URL. The
//! [`ProgressReporter`] turns those into a single indicatif bar with one
//! tick per item, and prints failures above the bar as they happen.
//!
//! # Examples
//!
//! ```rust,no_run
//! use aerial_fetcher::app::ProgressEvent;
//! use aerial_fetcher::cli::ProgressReporter;
//!
//! # async fn example() {
//! let (tx, rx) = tokio::sync::mpsc::channel(16);
//! let reporter = ProgressReporter::new(1, true);
//! let display = tokio::spawn(reporter.consume(rx));
//!
//! tx.send(ProgressEvent::Completed { url: "https://x/a.mov".into(), bytes: 10 })
//!     .await
//!     .unwrap();
//! drop(tx);
//!
//! let tally = display.await.unwrap();
//! assert_eq!(tally.completed, 1);
//! # }
//! ```

use std::time::Duration;

use chrono::Local;
use indicatif::{HumanBytes, HumanDuration, ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::{ProgressEvent, RunResult};

/// Start time format used by the run summary
const SUMMARY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Counts of the events seen by a reporter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTally {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub bytes: u64,
}

impl ProgressTally {
    pub fn total(&self) -> usize {
        self.completed + self.skipped + self.failed + self.cancelled
    }
}

/// Renders scheduler progress on the terminal
pub struct ProgressReporter {
    bar: ProgressBar,
    tally: ProgressTally,
}

impl ProgressReporter {
    /// Create a reporter for `total` items
    ///
    /// A disabled reporter keeps counting but draws nothing; failures are
    /// still printed to stderr.
    pub fn new(total: usize, enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            tally: ProgressTally::default(),
        }
    }

    /// Record one finished item
    pub fn handle(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Completed { url, bytes } => {
                self.tally.completed += 1;
                self.tally.bytes += bytes;
                self.bar.set_message(format!("downloaded {}", short_name(url)));
            }
            ProgressEvent::Skipped { url, reason } => {
                self.tally.skipped += 1;
                debug!("Skipped {}: {}", url, reason);
                self.bar.set_message(format!("skipped {}", short_name(url)));
            }
            ProgressEvent::Failed { url, message } => {
                self.tally.failed += 1;
                self.bar
                    .suspend(|| eprintln!("Error Downloading '{}': {}", url, message));
            }
            ProgressEvent::Cancelled { .. } => {
                self.tally.cancelled += 1;
            }
        }
        self.bar.inc(1);
    }

    /// Drain `rx` until every sender is dropped, then clear the bar
    pub async fn consume(mut self, mut rx: mpsc::Receiver<ProgressEvent>) -> ProgressTally {
        while let Some(event) = rx.recv().await {
            self.handle(&event);
        }
        self.bar.finish_and_clear();
        self.tally
    }

    pub fn tally(&self) -> ProgressTally {
        self.tally
    }
}

/// Last path segment of a URL, for compact bar messages
fn short_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Print the end-of-run summary to stdout
pub fn print_summary(result: &RunResult) {
    println!("{}", summary_line(result));
}

/// One-line summary of a run, with its local start time
pub fn summary_line(result: &RunResult) -> String {
    format!(
        "Run started {}, finished in {}: {} downloaded ({}), {} skipped, {} failed{}",
        result
            .started_at
            .with_timezone(&Local)
            .format(SUMMARY_TIME_FORMAT),
        HumanDuration(result.duration),
        result.completed,
        HumanBytes(result.bytes_downloaded),
        result.skipped,
        result.failed,
        if result.cancelled_items > 0 {
            format!(", {} cancelled", result.cancelled_items)
        } else {
            String::new()
        }
    )
}
