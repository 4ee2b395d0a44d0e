//! Aerial Fetcher CLI application
//!
//! Command-line interface for downloading aerial screensaver videos listed
//! in a JSON manifest. Features bounded parallel downloads, length-based
//! resume and graceful cancellation on CTRL+C.

use std::process;

use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use aerial_fetcher::cli::{handle_download, Cli, Commands, CANCELLED_MESSAGE};
use aerial_fetcher::config::AppConfig;
use aerial_fetcher::constants::logging;
use aerial_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) if e.is_cancelled() => {
            println!("{}", CANCELLED_MESSAGE);
            0
        }
        Err(e) => {
            debug!("Fatal {} error: {:?}", e.category(), e);
            eprintln!("Something bad happened: {}", e);
            1
        }
    };

    process::exit(code);
}

/// Main application logic
async fn run() -> Result<i32> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Config is read before logging starts so its level can apply
    let config = AppConfig::load(cli.global.config.as_deref()).await;
    let level = match (cli.requested_log_level(), &config) {
        (Some(level), _) => level,
        (None, Ok(config)) => config.logging.level().unwrap_or(Level::WARN),
        (None, Err(_)) => cli.log_level(),
    };
    init_logging(&cli, level);
    let config = config?;

    info!("Aerial Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args, &config, cli.global.quiet).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli, level: Level) {
    let filter = EnvFilter::from_default_env();
    let filter = match format!("{}={}", logging::LOG_TARGET, level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
