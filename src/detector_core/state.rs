//! Strategy State Store - per-symbol rolling state owned by the detector

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

/// Time-windowed samples for spike detection, oldest first
#[derive(Debug, Clone, Default)]
pub struct SpikeWindow {
    samples: VecDeque<PriceSample>,
}

impl SpikeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Timestamps never go backwards: a sample observed
    /// before the newest one is recorded at the newest one's time.
    pub fn push(&mut self, mut sample: PriceSample) {
        if let Some(last) = self.samples.back() {
            if sample.observed_at < last.observed_at {
                sample.observed_at = last.observed_at;
            }
        }
        self.samples.push_back(sample);
    }

    /// Drop samples older than `window`. The newest sample is always kept.
    pub fn evict_before(&mut self, now: DateTime<Utc>, window: Duration) {
        while self.samples.len() > 1 {
            match self.samples.front() {
                Some(oldest) if now - oldest.observed_at > window => {
                    self.samples.pop_front();
                }
                _ => break,
            }
        }
    }

    pub fn oldest(&self) -> Option<&PriceSample> {
        self.samples.front()
    }

}

/// Bounded FIFO of the last `sample_size` prices
#[derive(Debug, Clone)]
pub struct MovingAverageWindow {
    prices: VecDeque<f64>,
    sample_size: usize,
}

impl MovingAverageWindow {
    pub fn new(sample_size: usize) -> Self {
        Self {
            prices: VecDeque::with_capacity(sample_size + 1),
            sample_size,
        }
    }

    /// Push a price, returning the evicted oldest price once the window is full
    pub fn push(&mut self, price: f64) -> Option<f64> {
        self.prices.push_back(price);
        if self.prices.len() > self.sample_size {
            self.prices.pop_front()
        } else {
            None
        }
    }

    /// Holds exactly `sample_size` prices
    pub fn is_full(&self) -> bool {
        self.prices.len() == self.sample_size
    }

    pub fn mean(&self) -> Option<f64> {
        if self.prices.is_empty() {
            return None;
        }
        Some(self.prices.iter().sum::<f64>() / self.prices.len() as f64)
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum StrategyState {
    Spike(SpikeWindow),
    MovingAverage(MovingAverageWindow),
}

/// Rolling state for every evaluated symbol
#[derive(Debug, Default)]
pub struct StateStore {
    states: HashMap<String, StrategyState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spike window for `symbol`, replacing state left by a different strategy
    pub fn spike_window(&mut self, symbol: &str) -> &mut SpikeWindow {
        let state = self
            .states
            .entry(symbol.to_string())
            .or_insert_with(|| StrategyState::Spike(SpikeWindow::new()));

        if !matches!(state, StrategyState::Spike(_)) {
            *state = StrategyState::Spike(SpikeWindow::new());
        }
        match state {
            StrategyState::Spike(window) => window,
            StrategyState::MovingAverage(_) => unreachable!("state was just replaced"),
        }
    }

    /// Moving-average window for `symbol`, reset if the sample size changed
    pub fn moving_average_window(&mut self, symbol: &str, sample_size: usize) -> &mut MovingAverageWindow {
        let state = self
            .states
            .entry(symbol.to_string())
            .or_insert_with(|| StrategyState::MovingAverage(MovingAverageWindow::new(sample_size)));

        let reusable = matches!(state, StrategyState::MovingAverage(w) if w.sample_size() == sample_size);
        if !reusable {
            *state = StrategyState::MovingAverage(MovingAverageWindow::new(sample_size));
        }
        match state {
            StrategyState::MovingAverage(window) => window,
            StrategyState::Spike(_) => unreachable!("state was just replaced"),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&StrategyState> {
        self.states.get(symbol)
    }

    /// Forget a symbol's rolling state
    pub fn reset(&mut self, symbol: &str) {
        self.states.remove(symbol);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
