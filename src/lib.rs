//! Tickwatch - streaming price anomaly detection
//!
//! A synthetic price feed advances on its own timer while a detector, on a
//! separate timer, evaluates each configured symbol with either a spike/drop
//! strategy or a moving-average deviation strategy. Alerts land in a bounded
//! newest-first history and an append-only durable log.

pub mod alert_sink;
pub mod config;
pub mod detector_core;
pub mod feed;
pub mod query;
pub mod sqlite_pragma;

pub use alert_sink::{Alert, AlertSink};
pub use config::{ConfigError, LogBackendType, RuntimeConfig};
pub use detector_core::{AnomalyDetector, Strategy, SymbolTable};
pub use feed::{PriceFeed, PriceSource};
