//! CLI Module
//!
//! Command-line interface for weekgoals using Clap v4.

mod commands;
mod ui;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::WeekGoalsError;

/// weekgoals - plan twelve weeks of goals and track your progress
#[derive(Parser, Debug)]
#[command(name = "weekgoals")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (writes log files, see `weekgoals logs status`)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive TUI mode (default)
    Tui,

    /// Validate a TOML goal group draft and send it
    Submit {
        /// Draft file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show week progress
    Progress {
        /// Start of the 12-week period (YYYY-MM-DD); defaults to the configured date
        #[arg(short, long)]
        start_date: Option<NaiveDate>,
    },

    /// Finish authorization after a submission with the code from the browser
    Authorize {
        /// Authorization code
        code: String,
    },

    /// Show your task lists, authorizing first if no cached token exists
    Lists {
        /// Authorization code, when already at hand
        #[arg(long)]
        code: Option<String>,

        /// Open the authorization URL in the browser
        #[arg(long)]
        open: bool,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config,

    /// Log management operations
    Logs {
        #[command(subcommand)]
        operation: LogCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Show log file location and status
    Status,
    /// Clean up old log files
    Clean {
        /// Maximum age in days (default: 7)
        #[arg(short = 'a', long, default_value = "7")]
        days: u64,
    },
}

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    let result = dispatch(cli).await;

    if let Err(e) = &result
        && let Some(err) = e.downcast_ref::<WeekGoalsError>()
    {
        tracing::error!("{} ({:?})", err, err.code());
        if err.code().is_retryable() {
            eprintln!("This may be temporary; run the command again to retry.");
        }
    }
    result
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        None | Some(Commands::Tui) => ui::cmd_tui(&config).await,
        Some(Commands::Submit { file }) => commands::cmd_submit(&config, &file).await,
        Some(Commands::Progress { start_date }) => {
            commands::cmd_progress(&config, start_date).await
        }
        Some(Commands::Authorize { code }) => commands::cmd_authorize(&config, &code).await,
        Some(Commands::Lists { code, open }) => {
            commands::cmd_lists(&config, code.as_deref(), open).await
        }
        Some(Commands::Init { force }) => commands::cmd_init(force),
        Some(Commands::Config) => commands::cmd_config(&config),
        Some(Commands::Logs { operation }) => commands::cmd_logs(operation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_tui() {
        let cli = Cli::try_parse_from(["weekgoals"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_progress_start_date_parses() {
        let cli = Cli::try_parse_from(["weekgoals", "-d", "progress", "--start-date", "2025-07-14"])
            .unwrap();
        assert!(cli.debug);
        assert!(matches!(
            cli.command,
            Some(Commands::Progress { start_date }) if start_date == NaiveDate::from_ymd_opt(2025, 7, 14)
        ));
    }

    #[test]
    fn test_progress_rejects_bad_date() {
        assert!(Cli::try_parse_from(["weekgoals", "progress", "-s", "14/07/2025"]).is_err());
    }

    #[test]
    fn test_logs_clean_default_days() {
        let cli = Cli::try_parse_from(["weekgoals", "logs", "clean"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Logs {
                operation: LogCommands::Clean { days: 7 }
            })
        ));
    }
}
