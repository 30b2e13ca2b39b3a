//! Detector Core - per-symbol rolling state and strategy evaluation
//!
//! # Architecture
//!
//! ```text
//! price_scheduler_task ──advance──> PriceFeed
//!                                       │ current_price (latest value, never blocks)
//! detection_scheduler_task ──> AnomalyDetector::run_tick
//!                                       │ per symbol, configuration order
//!                         StateStore ── Spike | MovingAverage evaluation
//!                                       │
//!                                   AlertSink::emit
//! ```

pub mod detector;
pub mod moving_average;
pub mod scheduler;
pub mod spike;
pub mod state;
pub mod strategy;

pub use detector::{AnomalyDetector, DetectionError, TickReport};
pub use moving_average::evaluate_moving_average;
pub use scheduler::{detection_scheduler_task, price_scheduler_task};
pub use spike::{evaluate_spike, Direction};
pub use state::{MovingAverageWindow, PriceSample, SpikeWindow, StateStore, StrategyState};
pub use strategy::{Strategy, SymbolConfig, SymbolTable};
