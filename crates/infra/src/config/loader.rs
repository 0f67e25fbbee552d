//! Configuration loader
//!
//! Loads pipeline configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory is applied first, if present
//! 2. Attempts to load from environment variables
//! 3. If `EXTRACTION_DB_PATH` is unset, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `EXTRACTION_DB_PATH`: Database file path (required)
//! - `EXTRACTION_DB_POOL_SIZE`: Connection pool size
//! - `EXTRACTION_HTTP_TIMEOUT_SECS`: Per-call HTTP timeout
//! - `EXTRACTION_HTTP_USER_AGENT`: User-Agent sent with every call
//! - `EXTRACTION_AUTH_TOKEN_URL`: Identity endpoint
//! - `EXTRACTION_AUTH_TOKEN_LIFETIME_SECS`: Fallback token lifetime
//! - `EXTRACTION_LOG_LEVEL`: Default log filter
//! - `EXTRACTION_LOG_JSON`: Emit JSON logs (true/false)
//!
//! Accounts cannot be expressed through the environment; they come from a
//! config file.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` or `./extraction.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use extraction_domain::{
    AuthConfig, Config, DatabaseConfig, ExtractionError, HttpConfig, LoggingConfig, Result,
};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "extraction.json", "extraction.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ExtractionError::Config` if neither the environment nor any
/// config file yields a valid configuration.
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(err) => {
            tracing::debug!(error = %err, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `EXTRACTION_DB_PATH` is required; every other value falls back to
/// its default.
pub fn load_from_env() -> Result<Config> {
    let database_defaults = DatabaseConfig::default();
    let http_defaults = HttpConfig::default();
    let auth_defaults = AuthConfig::default();
    let logging_defaults = LoggingConfig::default();

    Ok(Config {
        database: DatabaseConfig {
            path: env_var("EXTRACTION_DB_PATH")?,
            pool_size: env_parse("EXTRACTION_DB_POOL_SIZE", database_defaults.pool_size)?,
        },
        http: HttpConfig {
            timeout_secs: env_parse("EXTRACTION_HTTP_TIMEOUT_SECS", http_defaults.timeout_secs)?,
            user_agent: std::env::var("EXTRACTION_HTTP_USER_AGENT")
                .unwrap_or(http_defaults.user_agent),
        },
        auth: AuthConfig {
            token_url: std::env::var("EXTRACTION_AUTH_TOKEN_URL")
                .unwrap_or(auth_defaults.token_url),
            token_lifetime_secs: env_parse(
                "EXTRACTION_AUTH_TOKEN_LIFETIME_SECS",
                auth_defaults.token_lifetime_secs,
            )?,
            accounts: auth_defaults.accounts,
        },
        logging: LoggingConfig {
            level: std::env::var("EXTRACTION_LOG_LEVEL").unwrap_or(logging_defaults.level),
            json: env_bool("EXTRACTION_LOG_JSON", logging_defaults.json),
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`]. Format is chosen by extension.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ExtractionError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ExtractionError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ExtractionError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ExtractionError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ExtractionError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first existing candidate.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut bases = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        bases.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        bases.push(exe_dir);
    }

    bases.iter().flat_map(|base| candidates_under(base)).find(|path| path.exists())
}

fn candidates_under(base: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> =
        CONFIG_FILE_NAMES.iter().map(|name| base.join(name)).collect();
    for parent in ["..", "../.."] {
        candidates.push(base.join(parent).join("config.json"));
        candidates.push(base.join(parent).join("config.toml"));
    }
    candidates
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ExtractionError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional variable, using `default` when it is unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ExtractionError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
