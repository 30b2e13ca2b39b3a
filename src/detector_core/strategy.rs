//! Per-symbol strategy configuration
//!
//! The symbol file is a JSON object keyed by symbol, evaluated in file order:
//!
//! ```json
//! {
//!   "AAPL": { "strategy": "spike", "windowSec": 5, "thresholdPercent": 2 },
//!   "MSFT": { "strategy": "movingAverage", "sampleSize": 10, "deviationPercent": 1.5 }
//! }
//! ```

use crate::alert_sink::{MOVING_AVERAGE_LABEL, SPIKE_LABEL};
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detection strategy for one symbol. Parameters of the other variant are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy")]
pub enum Strategy {
    #[serde(rename = "spike")]
    Spike {
        #[serde(rename = "windowSec", alias = "windowSeconds")]
        window_secs: f64,
        #[serde(rename = "thresholdPercent")]
        threshold_percent: f64,
    },
    #[serde(rename = "movingAverage")]
    MovingAverage {
        #[serde(rename = "sampleSize")]
        sample_size: usize,
        #[serde(rename = "deviationPercent")]
        deviation_percent: f64,
    },
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Spike { .. } => SPIKE_LABEL,
            Strategy::MovingAverage { .. } => MOVING_AVERAGE_LABEL,
        }
    }

    /// Reject parameters that would make evaluation meaningless
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Strategy::Spike {
                window_secs,
                threshold_percent,
            } => {
                if !(window_secs.is_finite() && window_secs > 0.0) {
                    return Err(format!("windowSec must be positive, got {}", window_secs));
                }
                if !(threshold_percent.is_finite() && threshold_percent > 0.0) {
                    return Err(format!(
                        "thresholdPercent must be positive, got {}",
                        threshold_percent
                    ));
                }
            }
            Strategy::MovingAverage {
                sample_size,
                deviation_percent,
            } => {
                if sample_size == 0 {
                    return Err("sampleSize must be at least 1".to_string());
                }
                if !(deviation_percent.is_finite() && deviation_percent > 0.0) {
                    return Err(format!(
                        "deviationPercent must be positive, got {}",
                        deviation_percent
                    ));
                }
            }
        }
        Ok(())
    }
}

/// One configured symbol. `strategy` is `None` when the entry could not be
/// understood; such symbols are priced but never evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolConfig {
    pub symbol: String,
    pub strategy: Option<Strategy>,
}

/// Ordered symbol -> strategy table
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolConfig>,
}

impl SymbolTable {
    pub fn new(entries: Vec<SymbolConfig>) -> Self {
        Self { entries }
    }

    /// Build a table where every symbol has a valid strategy
    pub fn from_strategies<I, S>(strategies: I) -> Self
    where
        I: IntoIterator<Item = (S, Strategy)>,
        S: Into<String>,
    {
        Self {
            entries: strategies
                .into_iter()
                .map(|(symbol, strategy)| SymbolConfig {
                    symbol: symbol.into(),
                    strategy: Some(strategy),
                })
                .collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} symbols ({} evaluated) from {}",
            table.len(),
            table.evaluated_count(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| {
            ConfigError::InvalidValue("symbol configuration must be a JSON object".to_string())
        })?;

        let entries = object
            .iter()
            .map(|(symbol, raw)| {
                let strategy = match Strategy::deserialize(raw) {
                    Ok(strategy) => match strategy.validate() {
                        Ok(()) => Some(strategy),
                        Err(reason) => {
                            log::warn!("⚠️  {} will not be evaluated: {}", symbol, reason);
                            None
                        }
                    },
                    Err(e) => {
                        log::warn!("⚠️  {} has no usable strategy, skipping evaluation: {}", symbol, e);
                        None
                    }
                };
                SymbolConfig {
                    symbol: symbol.clone(),
                    strategy,
                }
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolConfig> {
        self.entries.iter()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolConfig> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn evaluated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.strategy.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_strategies_in_file_order() {
        let table = SymbolTable::from_json_str(
            r#"{
                "TSLA": { "strategy": "movingAverage", "sampleSize": 3, "deviationPercent": 5 },
                "AAPL": { "strategy": "spike", "windowSec": 5, "thresholdPercent": 10 }
            }"#,
        )
        .unwrap();

        let symbols: Vec<&str> = table.symbols().collect();
        assert_eq!(symbols, vec!["TSLA", "AAPL"]);

        assert_eq!(
            table.get("AAPL").unwrap().strategy,
            Some(Strategy::Spike {
                window_secs: 5.0,
                threshold_percent: 10.0
            })
        );
        assert_eq!(
            table.get("TSLA").unwrap().strategy,
            Some(Strategy::MovingAverage {
                sample_size: 3,
                deviation_percent: 5.0
            })
        );
    }

    #[test]
    fn test_other_strategy_params_ignored() {
        let table = SymbolTable::from_json_str(
            r#"{ "X": { "strategy": "spike", "windowSec": 5, "thresholdPercent": 10, "sampleSize": 3 } }"#,
        )
        .unwrap();
        assert!(matches!(
            table.get("X").unwrap().strategy,
            Some(Strategy::Spike { .. })
        ));
    }

    #[test]
    fn test_unknown_strategy_is_not_an_error() {
        let table = SymbolTable::from_json_str(
            r#"{
                "A": { "strategy": "bollinger", "bands": 2 },
                "B": { "windowSec": 5, "thresholdPercent": 10 },
                "C": { "strategy": "spike", "windowSec": 0, "thresholdPercent": 10 },
                "D": { "strategy": "movingAverage", "sampleSize": 0, "deviationPercent": 5 },
                "E": { "strategy": "spike", "windowSec": 5, "thresholdPercent": 10 }
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(table.evaluated_count(), 1);
        assert!(table.get("A").unwrap().strategy.is_none());
        assert!(table.get("B").unwrap().strategy.is_none());
        assert!(table.get("C").unwrap().strategy.is_none());
        assert!(table.get("D").unwrap().strategy.is_none());
        assert!(table.get("E").unwrap().strategy.is_some());
    }

    #[test]
    fn test_empty_object_gives_empty_table() {
        let table = SymbolTable::from_json_str("{}").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.evaluated_count(), 0);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            SymbolTable::from_json_str("[1, 2, 3]"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            SymbolTable::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_labels() {
        let spike = Strategy::Spike {
            window_secs: 5.0,
            threshold_percent: 1.0,
        };
        assert_eq!(spike.label(), "% spike OR drop");
        let ma = Strategy::MovingAverage {
            sample_size: 5,
            deviation_percent: 1.0,
        };
        assert_eq!(ma.label(), "movingAverage");
    }
}
