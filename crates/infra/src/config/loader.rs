//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CANVAS_BASE_URL` is not set, falls back to loading from file
//! 3. Searches several directories for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CANVAS_BASE_URL`: Canvas instance (required for env loading)
//! - `CANVAS_USER_AGENT`: User-Agent header value
//! - `CANVAS_TIMEOUT_SECONDS`: Request timeout
//! - `CANVAS_RATE_LIMIT_DELAY_MS`: Delay before replaying a throttled request
//! - `CANVAS_RATE_LIMIT_MAX_RETRIES`: Cap on throttled replays (unset = no cap)
//! - `CANVAS_TRANSPORT_MAX_ATTEMPTS`: Attempts for connection failures
//! - `CANVAS_SESSION_STORE`: Session file path
//! - `CANVAS_LOG_LEVEL`: Log filter directive
//! - `CANVAS_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./canvas.toml` or `./canvas.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent directory
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use canvas_domain::{ApiConfig, CanvasError, Config, LoggingConfig, Result, SessionConfig};

const CONFIG_FILE_NAMES: &[&str] = &["canvas.toml", "canvas.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when `CANVAS_BASE_URL` is set; otherwise the
/// first config file found is used.
///
/// # Errors
/// Returns `CanvasError::Config` if:
/// - Neither `CANVAS_BASE_URL` nor a config file is present
/// - File format is invalid
/// - An environment value cannot be parsed
pub fn load() -> Result<Config> {
    load_if_present()?.ok_or_else(|| {
        CanvasError::Config(
            "CANVAS_BASE_URL is not set and no config file was found".to_string(),
        )
    })
}

/// Like [`load`], but `Ok(None)` when there is nothing to load.
///
/// Errors in a source that is present (a bad `CANVAS_*` value, a malformed
/// file) are returned rather than skipped.
///
/// # Errors
/// Returns `CanvasError::Config` if the selected source cannot be parsed.
pub fn load_if_present() -> Result<Option<Config>> {
    if std::env::var_os("CANVAS_BASE_URL").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(Some(config));
    }

    match find_config_file() {
        Some(path) => load_from_file(Some(path)).map(Some),
        None => {
            tracing::debug!("CANVAS_BASE_URL not set and no config file found");
            Ok(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `CANVAS_BASE_URL` is required; everything else falls back to the
/// defaults in [`canvas_domain::config`].
///
/// # Errors
/// Returns `CanvasError::Config` if `CANVAS_BASE_URL` is missing or a
/// numeric variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let defaults = ApiConfig::default();

    let api = ApiConfig {
        base_url: env_var("CANVAS_BASE_URL")?,
        user_agent: std::env::var("CANVAS_USER_AGENT").unwrap_or(defaults.user_agent),
        timeout_seconds: env_parse("CANVAS_TIMEOUT_SECONDS")?.unwrap_or(defaults.timeout_seconds),
        rate_limit_delay_ms: env_parse("CANVAS_RATE_LIMIT_DELAY_MS")?
            .unwrap_or(defaults.rate_limit_delay_ms),
        rate_limit_max_retries: env_parse("CANVAS_RATE_LIMIT_MAX_RETRIES")?,
        transport_max_attempts: env_parse("CANVAS_TRANSPORT_MAX_ATTEMPTS")?
            .unwrap_or(defaults.transport_max_attempts),
    };

    let logging_defaults = LoggingConfig::default();

    Ok(Config {
        api,
        session: SessionConfig { store_path: std::env::var("CANVAS_SESSION_STORE").ok() },
        logging: LoggingConfig {
            level: std::env::var("CANVAS_LOG_LEVEL").unwrap_or(logging_defaults.level),
            json: env_bool("CANVAS_LOG_JSON", logging_defaults.json),
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations for a config file.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CanvasError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CanvasError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            CanvasError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CanvasError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `CanvasError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CanvasError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CanvasError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CanvasError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Find the first existing configuration file
///
/// Searches the current working directory, its parent, and the executable's
/// directory, trying [`CONFIG_FILE_NAMES`] in each.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `CanvasError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CanvasError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `CanvasError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CanvasError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
