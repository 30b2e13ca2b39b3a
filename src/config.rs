//! Runtime configuration from environment variables

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogBackendType {
    Jsonl,
    Sqlite,
}

impl LogBackendType {
    pub fn default_path(&self) -> &'static str {
        match self {
            LogBackendType::Jsonl => "alerts_log.jsonl",
            LogBackendType::Sqlite => "alerts.db",
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidValue(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse configuration: {}", e),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the detection runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// JSON file mapping symbol -> strategy parameters
    pub symbols_path: PathBuf,

    /// Price feed advance interval in milliseconds
    pub price_interval_ms: u64,

    /// Detection pass interval in milliseconds
    pub detection_interval_ms: u64,

    /// Durable alert log backend
    pub log_backend: LogBackendType,

    /// Durable alert log location (file for JSONL, database for SQLite)
    pub log_path: PathBuf,

    /// Query endpoint bind address
    pub api_bind: String,

    /// Bearer token for the query endpoint; endpoint disabled when unset
    pub api_token: Option<String>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TICKWATCH_SYMBOLS_PATH` (default: config.json)
    /// - `PRICE_INTERVAL_MS` (default: 1000)
    /// - `DETECTION_INTERVAL_MS` (default: 1000)
    /// - `ALERT_LOG_BACKEND` (`jsonl` | `sqlite`, default: jsonl)
    /// - `ALERT_LOG_PATH` (default: alerts_log.jsonl / alerts.db)
    /// - `ALERT_API_BIND` (default: 127.0.0.1:3000)
    /// - `ALERT_API_TOKEN` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_backend = match env::var("ALERT_LOG_BACKEND")
            .unwrap_or_else(|_| "jsonl".to_string())
            .to_lowercase()
            .as_str()
        {
            "jsonl" => LogBackendType::Jsonl,
            "sqlite" => LogBackendType::Sqlite,
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "ALERT_LOG_BACKEND must be 'jsonl' or 'sqlite', got '{}'",
                    other
                )))
            }
        };

        let price_interval_ms = parse_interval("PRICE_INTERVAL_MS", 1_000)?;
        let detection_interval_ms = parse_interval("DETECTION_INTERVAL_MS", 1_000)?;

        Ok(Self {
            symbols_path: env::var("TICKWATCH_SYMBOLS_PATH")
                .unwrap_or_else(|_| "config.json".to_string())
                .into(),
            price_interval_ms,
            detection_interval_ms,
            log_backend,
            log_path: env::var("ALERT_LOG_PATH")
                .unwrap_or_else(|_| log_backend.default_path().to_string())
                .into(),
            api_bind: env::var("ALERT_API_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            api_token: env::var("ALERT_API_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        })
    }
}

fn parse_interval(var: &str, default: u64) -> Result<u64, ConfigError> {
    let value = env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default);

    if value == 0 {
        return Err(ConfigError::InvalidValue(format!("{} must be greater than zero", var)));
    }
    Ok(value)
}
