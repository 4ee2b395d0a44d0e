//! Signal handling for graceful shutdown
//!
//! On CTRL-C (or SIGTERM on unix) the handler cancels the run's
//! [`CancellationToken`]. Transfers observe the token at their next
//! checkpoint, remove partial files and the run winds down.

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Signal handler that cancels a token on interrupt
pub struct SignalHandler {
    token: CancellationToken,
    notice: Option<String>,
}

impl SignalHandler {
    /// Create a new signal handler for the given token
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            notice: None,
        }
    }

    /// Print `notice` to stderr when a signal arrives
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    /// Setup signal handling for graceful shutdown (CTRL-C, SIGTERM)
    ///
    /// Returns a handle to the background task that monitors for signals.
    /// The task also ends, without cancelling anything, once the token has
    /// been cancelled by someone else.
    pub fn setup(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                    }
                    Err(e) => {
                        warn!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received Ctrl+C, initiating shutdown");
                },
                _ = terminate => {
                    info!("Received terminate signal, initiating shutdown");
                },
                _ = self.token.cancelled() => {
                    return;
                },
            }

            if let Some(notice) = &self.notice {
                eprintln!("{}", notice);
            }
            self.token.cancel();
        })
    }
}
