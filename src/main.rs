use anyhow::Result;
use clap::Parser;
use weekgoals::{cli, config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file before anything else (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Parse CLI arguments first to check for debug flag
    let cli_args = cli::Cli::parse();

    let mut log_config = logging::LogConfig::new().with_debug_mode(cli_args.debug);

    // Config errors are reported by the command itself
    let file_config = match cli_args.config.as_deref() {
        Some(path) => config::Config::load_from_path(path),
        None => config::Config::load(),
    };
    if cli_args.debug
        && let Ok(file_config) = file_config
    {
        log_config = log_config.with_level(file_config.logging.level);
    }

    if let Ok(log_dir) = std::env::var("WEEKGOALS_LOG_DIR") {
        log_config = log_config.with_log_dir(std::path::PathBuf::from(log_dir));
    }

    let _guard = logging::init_logging(log_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    // Keep the last week of logs
    if cli_args.debug
        && let Ok(removed) = logging::cleanup_old_logs(7)
        && removed > 0
    {
        tracing::info!("Cleaned up {} old log file(s)", removed);
    }

    cli::run().await
}
