//! Where emitted alerts go to survive a restart. Backends only ever append.

use super::alert::Alert;
use async_trait::async_trait;

#[derive(Debug)]
pub enum AlertLogError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Database(String),
}

impl From<std::io::Error> for AlertLogError {
    fn from(err: std::io::Error) -> Self {
        AlertLogError::Io(err)
    }
}

impl From<serde_json::Error> for AlertLogError {
    fn from(err: serde_json::Error) -> Self {
        AlertLogError::Serialization(err)
    }
}

impl From<rusqlite::Error> for AlertLogError {
    fn from(err: rusqlite::Error) -> Self {
        AlertLogError::Database(err.to_string())
    }
}

impl std::fmt::Display for AlertLogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLogError::Io(e) => write!(f, "alert log I/O failed: {}", e),
            AlertLogError::Serialization(e) => write!(f, "could not encode alert record: {}", e),
            AlertLogError::Database(e) => write!(f, "alert table write failed: {}", e),
        }
    }
}

impl std::error::Error for AlertLogError {}

#[async_trait]
pub trait AlertLogBackend: Send {
    /// Write `alert` as one record after every record already in the log.
    /// On error nothing is considered written and the caller may retry.
    async fn append(&mut self, alert: &Alert) -> Result<(), AlertLogError>;

    /// Make appended alerts durable
    async fn flush(&mut self) -> Result<(), AlertLogError>;

    /// Short name shown in alert-log warnings
    fn backend_type(&self) -> &'static str;
}
