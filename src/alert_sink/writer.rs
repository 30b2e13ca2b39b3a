//! Alert log chosen by `ALERT_LOG_BACKEND`

use super::alert::Alert;
use super::jsonl_log::JsonlAlertLog;
use super::log_backend::{AlertLogBackend, AlertLogError};
use super::sqlite_log::SqliteAlertLog;
use crate::config::LogBackendType;
use async_trait::async_trait;
use std::path::Path;

/// JSON-lines file or SQLite table, picked once at startup
pub enum AlertLogWriter {
    Jsonl(JsonlAlertLog),
    Sqlite(SqliteAlertLog),
}

impl AlertLogWriter {
    /// Open the configured backend at `path`
    pub fn new(backend: LogBackendType, path: impl AsRef<Path>) -> Result<Self, AlertLogError> {
        match backend {
            LogBackendType::Jsonl => Ok(AlertLogWriter::Jsonl(JsonlAlertLog::new(path)?)),
            LogBackendType::Sqlite => Ok(AlertLogWriter::Sqlite(SqliteAlertLog::new(path)?)),
        }
    }
}

#[async_trait]
impl AlertLogBackend for AlertLogWriter {
    async fn append(&mut self, alert: &Alert) -> Result<(), AlertLogError> {
        match self {
            AlertLogWriter::Jsonl(w) => w.append(alert).await,
            AlertLogWriter::Sqlite(w) => w.append(alert).await,
        }
    }

    async fn flush(&mut self) -> Result<(), AlertLogError> {
        match self {
            AlertLogWriter::Jsonl(w) => w.flush().await,
            AlertLogWriter::Sqlite(w) => w.flush().await,
        }
    }

    fn backend_type(&self) -> &'static str {
        match self {
            AlertLogWriter::Jsonl(_) => "JSONL",
            AlertLogWriter::Sqlite(_) => "SQLite",
        }
    }
}
