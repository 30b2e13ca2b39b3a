//! Alert Sink - bounded in-memory history and durable alert log
//!
//! ```text
//! AnomalyDetector --emit--> AlertSink ──> AlertHistory (10, newest first)
//!                                     └─> AlertLogBackend (JSONL or SQLite, append-only)
//! ```

pub mod alert;
pub mod history;
pub mod jsonl_log;
pub mod log_backend;
pub mod sink;
pub mod sqlite_log;
pub mod writer;

pub use alert::{Alert, MOVING_AVERAGE_LABEL, SPIKE_LABEL};
pub use history::{AlertHistory, HISTORY_CAPACITY};
pub use jsonl_log::{read_alert_log, JsonlAlertLog};
pub use log_backend::{AlertLogBackend, AlertLogError};
pub use sink::{AlertSink, SinkStatsSnapshot};
pub use sqlite_log::SqliteAlertLog;
pub use writer::AlertLogWriter;
