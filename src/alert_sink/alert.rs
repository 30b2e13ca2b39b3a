//! Alert record emitted by the detector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SPIKE_LABEL: &str = "% spike OR drop";
pub const MOVING_AVERAGE_LABEL: &str = "movingAverage";

/// A single detected anomaly. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub symbol: String,
    pub strategy: String,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

impl Alert {
    pub fn new(
        symbol: impl Into<String>,
        strategy: impl Into<String>,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            strategy: strategy.into(),
            timestamp,
            reason: reason.into(),
        }
    }

    /// Parse one line of the JSONL alert log
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
