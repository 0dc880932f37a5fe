//! CLI subcommands: submit, progress, authorize, lists, init, config, logs.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::LogCommands;
use crate::api::{ApiClient, ApiError, GoalsApi};
use crate::auth::{self, AuthRelay, AuthState, RelayError};
use crate::config::Config;
use crate::error::WeekGoalsError;
use crate::goals::{GoalEditor, load_draft, validate};
use crate::logging;
use crate::tui::app::{AUTHORIZATION_FAILED_TEXT, SuccessView};
use crate::tui::render::{list_lines, progress_lines};

/// Load configuration from file or defaults
pub(crate) fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from custom path: {}", path);
        Config::load_from_path(path)?
    } else {
        tracing::debug!("Loading default configuration");
        Config::load()?
    };

    config
        .validate()
        .map_err(|e| WeekGoalsError::Config(e.to_string()))?;

    Ok(config)
}

fn client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(&config.api).map_err(|e| WeekGoalsError::from(e).into())
}

// --- submit -----------------------------------------------------------------

pub(crate) async fn cmd_submit(config: &Config, file: &Path) -> Result<()> {
    let editor = load_draft(file).map_err(WeekGoalsError::from)?;
    let api = client(config)?;
    submit_draft(&api, &editor, &mut io::stdout()).await
}

/// Validate and send a draft, then print the confirmation.
pub(crate) async fn submit_draft(
    api: &dyn GoalsApi,
    editor: &GoalEditor,
    out: &mut dyn Write,
) -> Result<()> {
    let group = validate(editor).map_err(WeekGoalsError::from)?;
    tracing::info!("Submitting goal group {:?}", group.name);

    let resp = api
        .create_goals(&group.to_request())
        .await
        .map_err(WeekGoalsError::from)?;
    let view = SuccessView::from_response(resp);

    writeln!(out, "✅ {}", view.message)?;
    writeln!(
        out,
        "   {} goal(s), starting {}",
        group.goals.len(),
        group.start_date
    )?;
    if let Some(url) = view.auth_url {
        writeln!(out, "\n🔑 Authorize access to your task lists:")?;
        writeln!(out, "   {url}")?;
        writeln!(out, "\n   Then run: weekgoals authorize <code>")?;
    }
    Ok(())
}

// --- progress ---------------------------------------------------------------

pub(crate) async fn cmd_progress(config: &Config, start_date: Option<NaiveDate>) -> Result<()> {
    let api = client(config)?;
    let start = start_date.unwrap_or(config.progress.start_date);
    show_progress(&api, start, &mut io::stdout()).await
}

pub(crate) async fn show_progress(
    api: &dyn GoalsApi,
    start: NaiveDate,
    out: &mut dyn Write,
) -> Result<()> {
    let progress = api
        .week_progress(start)
        .await
        .map_err(WeekGoalsError::from)?;

    writeln!(out, "📅 Week progress ({:.1}%)\n", progress.progress_percentage)?;
    for line in progress_lines(&progress) {
        writeln!(out, "   {line}")?;
    }
    Ok(())
}

// --- authorize --------------------------------------------------------------

pub(crate) async fn cmd_authorize(config: &Config, code: &str) -> Result<()> {
    let api = client(config)?;
    authorize(&api, code, &mut io::stdout()).await
}

/// Send a post-submission authorization code to the callback endpoint.
pub(crate) async fn authorize(api: &dyn GoalsApi, code: &str, out: &mut dyn Write) -> Result<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(WeekGoalsError::from(RelayError::EmptyCode).into());
    }

    match api.finalize_authorization(code).await {
        Ok(resp) => {
            writeln!(
                out,
                "✅ {}",
                resp.message.as_deref().unwrap_or("Authorization completed")
            )?;
            Ok(())
        }
        Err(e) => {
            writeln!(out, "❌ {AUTHORIZATION_FAILED_TEXT}")?;
            write_diagnostics(&e, out)?;
            Err(WeekGoalsError::from(e).into())
        }
    }
}

fn write_diagnostics(err: &ApiError, out: &mut dyn Write) -> io::Result<()> {
    if let ApiError::Server { status, step, .. } = err {
        writeln!(out, "   HTTP status: {status}")?;
        if let Some(step) = step {
            writeln!(out, "   Step: {step}")?;
        }
    }
    for hint in err.diagnostics() {
        writeln!(out, "   {hint}")?;
    }
    Ok(())
}

// --- lists ------------------------------------------------------------------

pub(crate) async fn cmd_lists(config: &Config, code: Option<&str>, open: bool) -> Result<()> {
    let api = client(config)?;
    let stdin = io::stdin();
    show_lists(&api, code, open, &mut stdin.lock(), &mut io::stdout()).await
}

/// Walk the auth relay to the lists: cached token first, otherwise print the
/// authorization URL and take a pasted code (from `code` or `input`).
pub(crate) async fn show_lists(
    api: &dyn GoalsApi,
    code: Option<&str>,
    open_browser: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    let mut relay = AuthRelay::new();
    auth::relay::start(&mut relay, api)
        .await
        .map_err(WeekGoalsError::from)?;

    if let Some(auth_url) = relay.auth_url().map(str::to_string) {
        writeln!(out, "🔑 No cached token. Authorize here and copy the code:")?;
        writeln!(out, "   {auth_url}\n")?;
        if open_browser && let Err(e) = open::that(&auth_url) {
            tracing::warn!("Could not open browser: {}", e);
        }

        let code = match code {
            Some(code) => code.to_string(),
            None => {
                write!(out, "Authorization code: ")?;
                out.flush()?;
                let mut line = String::new();
                input
                    .read_line(&mut line)
                    .context("Failed to read authorization code")?;
                line
            }
        };

        auth::relay::exchange_code(&mut relay, api, &code)
            .await
            .map_err(WeekGoalsError::from)?;
    }

    match relay.state() {
        AuthState::ListsDisplayed(lists) => {
            writeln!(out, "📋 Task lists\n")?;
            for line in list_lines(lists) {
                writeln!(out, "   {line}")?;
            }
            Ok(())
        }
        AuthState::Error { message } => anyhow::bail!("Could not load your lists: {message}"),
        other => anyhow::bail!("Authorization stopped in state {}", other.name()),
    }
}

// --- init / config / logs ---------------------------------------------------

/// Initialize configuration file
pub(crate) fn cmd_init(force: bool) -> Result<()> {
    println!("📝 weekgoals configuration\n");

    let config_path =
        Config::system_config_path().context("Could not determine config directory")?;
    write_default_config(&config_path, force)?;

    println!("✅ Configuration initialized at: {}", config_path.display());
    println!("\n   Edit [api] base_url to point at your backend,");
    println!("   then run 'weekgoals' to start.");
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            path.display()
        );
    }
    Config::default().save(path)
}

/// Show configuration
pub(crate) fn cmd_config(config: &Config) -> Result<()> {
    println!("📝 weekgoals configuration\n");
    if let Some(path) = Config::system_config_path() {
        println!("System config: {}", path.display());
    }
    println!("Local config:  {}\n", Config::local_config_path().display());

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn cmd_logs(operation: LogCommands) -> Result<()> {
    let log_dir = std::env::var("WEEKGOALS_LOG_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| logging::log_dir());

    match operation {
        LogCommands::Status => {
            println!("📊 weekgoals logging status\n");
            println!("Log directory: {}", log_dir.display());

            let files = logging::list_log_files_in(&log_dir)?;
            if files.is_empty() {
                println!("Status: no logs found");
            } else {
                let total_size: u64 = files
                    .iter()
                    .filter_map(|(path, _)| std::fs::metadata(path).ok())
                    .map(|m| m.len())
                    .sum();
                println!("Log files: {}", files.len());
                println!("Total size: {:.2} MB", total_size as f64 / (1024.0 * 1024.0));
                if let Some((newest, _)) = files.last() {
                    println!("Latest log: {}", newest.display());
                }
            }
            println!("\n💡 Run with -d to write debug logs");
        }
        LogCommands::Clean { days } => {
            println!("🧹 Cleaning up log files older than {} days...\n", days);
            let removed = logging::cleanup_logs_in(&log_dir, days)?;
            if removed > 0 {
                println!("✅ Removed {} old log file(s)", removed);
            } else {
                println!("✅ No old log files to remove");
            }
        }
    }
    Ok(())
}
