//! Anomaly Detector - one detection pass over every configured symbol
//!
//! Each symbol is evaluated behind its own isolation boundary: an error or a
//! panic while evaluating one symbol is reported in the [`TickReport`] and the
//! remaining symbols in the same tick are still evaluated.

use super::moving_average::evaluate_moving_average;
use super::spike::evaluate_spike;
use super::state::StateStore;
use super::strategy::{Strategy, SymbolTable};
use crate::alert_sink::{Alert, AlertSink};
use crate::feed::PriceSource;
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Feed has no price for a configured symbol
    MissingPrice(String),
    /// Feed returned NaN or infinity
    NonFinitePrice(String, f64),
    /// Evaluation panicked; the symbol's rolling state was reset
    Panicked(String, String),
}

impl std::fmt::Display for DetectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionError::MissingPrice(symbol) => write!(f, "No price available for {}", symbol),
            DetectionError::NonFinitePrice(symbol, price) => {
                write!(f, "Non-finite price {} for {}", price, symbol)
            }
            DetectionError::Panicked(symbol, msg) => {
                write!(f, "Evaluation of {} panicked: {}", symbol, msg)
            }
        }
    }
}

impl std::error::Error for DetectionError {}

/// Outcome of one detection pass
#[derive(Debug, Default)]
pub struct TickReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub alerts: Vec<Alert>,
    pub failures: Vec<DetectionError>,
}

pub struct AnomalyDetector {
    symbols: SymbolTable,
    feed: Arc<dyn PriceSource + Send + Sync>,
    sink: Arc<AlertSink>,
    store: StateStore,
    ticks: u64,
}

impl AnomalyDetector {
    pub fn new(
        symbols: SymbolTable,
        feed: Arc<dyn PriceSource + Send + Sync>,
        sink: Arc<AlertSink>,
    ) -> Self {
        Self {
            symbols,
            feed,
            sink,
            store: StateStore::new(),
            ticks: 0,
        }
    }

    /// Evaluate every configured symbol in configuration order and emit alerts
    pub async fn run_tick(&mut self, now: DateTime<Utc>) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport::default();

        for entry in self.symbols.iter() {
            let Some(strategy) = entry.strategy.as_ref() else {
                report.skipped += 1;
                continue;
            };

            let feed = &self.feed;
            let store = &mut self.store;
            let result = catch_unwind(AssertUnwindSafe(|| {
                evaluate_symbol(&entry.symbol, strategy, &**feed, store, now)
            }))
            .unwrap_or_else(|panic| {
                self.store.reset(&entry.symbol);
                Err(DetectionError::Panicked(
                    entry.symbol.clone(),
                    panic_message(panic.as_ref()),
                ))
            });

            match result {
                Ok(Some(alert)) => {
                    report.evaluated += 1;
                    self.sink.emit(alert.clone()).await;
                    report.alerts.push(alert);
                }
                Ok(None) => {
                    report.evaluated += 1;
                }
                Err(e) => {
                    log::warn!("⚠️  Skipping {} this tick: {}", entry.symbol, e);
                    report.failures.push(e);
                }
            }
        }

        log::debug!(
            "Detection tick {} done: {} evaluated, {} skipped, {} alerts, {} failures",
            self.ticks,
            report.evaluated,
            report.skipped,
            report.alerts.len(),
            report.failures.len()
        );

        report
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn state(&self) -> &StateStore {
        &self.store
    }
}

fn evaluate_symbol(
    symbol: &str,
    strategy: &Strategy,
    feed: &(dyn PriceSource + Send + Sync),
    store: &mut StateStore,
    now: DateTime<Utc>,
) -> Result<Option<Alert>, DetectionError> {
    let price = feed
        .current_price(symbol)
        .ok_or_else(|| DetectionError::MissingPrice(symbol.to_string()))?;

    if !price.is_finite() {
        return Err(DetectionError::NonFinitePrice(symbol.to_string(), price));
    }
    if price <= 0.0 {
        log::debug!("{}: non-positive price {}, skipping", symbol, price);
        return Ok(None);
    }

    let alert = match *strategy {
        Strategy::Spike {
            window_secs,
            threshold_percent,
        } => evaluate_spike(
            symbol,
            price,
            now,
            window_secs,
            threshold_percent,
            store.spike_window(symbol),
        ),
        Strategy::MovingAverage {
            sample_size,
            deviation_percent,
        } => evaluate_moving_average(
            symbol,
            price,
            now,
            deviation_percent,
            store.moving_average_window(symbol, sample_size),
        ),
    };

    Ok(alert)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
