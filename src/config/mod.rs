//! Configuration Module
//!
//! Layered settings for the backend connection, progress view, and terminal UI.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://12-week-goals-back-production.up.railway.app/api";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Week progress lookup
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Terminal UI
    #[serde(default)]
    pub ui: UiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Start of the tracked 12-week period
    #[serde(default = "default_progress_start")]
    pub start_date: NaiveDate,
}

fn default_progress_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 14).unwrap_or_default()
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            start_date: default_progress_start(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long the splash screen stays up
    #[serde(default = "default_splash_millis")]
    pub splash_millis: u64,
}

fn default_splash_millis() -> u64 {
    500
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            splash_millis: default_splash_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.config/weekgoals/config.toml
    /// 3. Local config: ./weekgoals.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        if let Some(system_config_path) = Self::system_config_path()
            && system_config_path.exists()
        {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(config, &system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(config, &local_config_path)?;
        }

        config = Self::apply_env_overrides(config)?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply environment
    /// overrides. The file must exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let config = Self::merge_from_file(Self::default(), path)?;
        Self::apply_env_overrides(config)
    }

    /// ~/.config/weekgoals/config.toml
    pub fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weekgoals").join("config.toml"))
    }

    /// ./weekgoals.toml
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("./weekgoals.toml")
    }

    fn merge_from_file(base: Self, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let overlay: PartialConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(Self::merge(base, overlay))
    }

    /// Field-level merge: anything the overlay file names replaces the base.
    fn merge(mut base: Self, overlay: PartialConfig) -> Self {
        if let Some(api) = overlay.api {
            if let Some(url) = api.base_url {
                base.api.base_url = url;
            }
            if let Some(secs) = api.timeout_secs {
                base.api.timeout_secs = secs;
            }
        }
        if let Some(start) = overlay.progress.and_then(|p| p.start_date) {
            base.progress.start_date = start;
        }
        if let Some(millis) = overlay.ui.and_then(|u| u.splash_millis) {
            base.ui.splash_millis = millis;
        }
        if let Some(level) = overlay.logging.and_then(|l| l.level) {
            base.logging.level = level;
        }
        base
    }

    fn apply_env_overrides(config: Self) -> Result<Self> {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    fn apply_overrides(
        mut config: Self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(url) = var("WEEKGOALS_API_URL") {
            config.api.base_url = url;
        }

        if let Some(secs) = var("WEEKGOALS_API_TIMEOUT_SECS") {
            config.api.timeout_secs = secs
                .parse()
                .with_context(|| format!("WEEKGOALS_API_TIMEOUT_SECS is not a number: {secs}"))?;
        }

        if let Some(date) = var("WEEKGOALS_PROGRESS_START_DATE") {
            config.progress.start_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .with_context(|| {
                    format!("WEEKGOALS_PROGRESS_START_DATE is not a YYYY-MM-DD date: {date}")
                })?;
        }

        if let Some(millis) = var("WEEKGOALS_SPLASH_MILLIS") {
            config.ui.splash_millis = millis
                .parse()
                .with_context(|| format!("WEEKGOALS_SPLASH_MILLIS is not a number: {millis}"))?;
        }

        if let Some(level) = var("WEEKGOALS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "Invalid API base URL: {:?}. Must start with http:// or https://",
                self.api.base_url
            );
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("API timeout must be greater than zero");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}

/// Config file as written by the user; every field optional.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    api: Option<PartialApi>,
    progress: Option<PartialProgress>,
    ui: Option<PartialUi>,
    logging: Option<PartialLogging>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialApi {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialProgress {
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialUi {
    splash_millis: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLogging {
    level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(
            config.progress.start_date,
            NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
        );
        assert_eq!(config.ui.splash_millis, 500);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "localhost:3000/api".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://localhost:3000/api"

[progress]
start_date = "2026-01-05"
"#
        )
        .unwrap();

        let config = Config::merge_from_file(Config::default(), file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(
            config.progress.start_date,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
        assert_eq!(config.ui.splash_millis, 500);
    }

    #[test]
    fn test_later_file_wins() {
        let mut first = NamedTempFile::new().unwrap();
        writeln!(first, "[ui]\nsplash_millis = 900\n[logging]\nlevel = \"warn\"").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        writeln!(second, "[logging]\nlevel = \"debug\"").unwrap();

        let config = Config::merge_from_file(Config::default(), first.path()).unwrap();
        let config = Config::merge_from_file(config, second.path()).unwrap();
        assert_eq!(config.ui.splash_millis, 900);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = ").unwrap();
        assert!(Config::merge_from_file(Config::default(), file.path()).is_err());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let err = Config::load_from_path("/nonexistent/weekgoals.toml").unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::apply_overrides(
            Config::default(),
            env(&[
                ("WEEKGOALS_API_URL", "http://127.0.0.1:8080/api"),
                ("WEEKGOALS_API_TIMEOUT_SECS", "5"),
                ("WEEKGOALS_PROGRESS_START_DATE", "2026-03-02"),
                ("WEEKGOALS_SPLASH_MILLIS", "0"),
                ("WEEKGOALS_LOG_LEVEL", "trace"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8080/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.progress.start_date,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
        assert_eq!(config.ui.splash_millis, 0);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_env_override_bad_numbers_are_errors() {
        for key in ["WEEKGOALS_API_TIMEOUT_SECS", "WEEKGOALS_SPLASH_MILLIS"] {
            let err = Config::apply_overrides(Config::default(), env(&[(key, "soon")]))
                .unwrap_err();
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn test_env_override_bad_date_is_an_error() {
        let result = Config::apply_overrides(
            Config::default(),
            env(&[("WEEKGOALS_PROGRESS_START_DATE", "14/07/2025")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.api.timeout_secs = 12;

        config.save(temp_file.path()).unwrap();

        let loaded = Config::merge_from_file(Config::default(), temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_paths() {
        let path = Config::system_config_path().unwrap();
        assert!(path.to_string_lossy().contains("weekgoals"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
        assert_eq!(Config::local_config_path(), PathBuf::from("./weekgoals.toml"));
    }
}
