//! Command-line interface components
//!
//! This module contains CLI-specific code for the Aerial Fetcher application:
//! argument parsing, command handling and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, DownloadArgs, GlobalArgs};
pub use commands::{handle_download, CANCELLED_MESSAGE, INTERRUPT_NOTICE};
pub use progress::{print_summary, summary_line, ProgressReporter, ProgressTally};
