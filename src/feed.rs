//! Price Feed - synthetic random-walk prices per symbol
//!
//! Only the current price is kept. Each symbol's price lives in its own
//! `AtomicU64` (f64 bits), so readers never block and never see a torn value.

use chrono::Local;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lowest price the random walk will produce
pub const MIN_PRICE: f64 = 0.01;

/// Largest absolute change applied in one tick
pub const MAX_STEP: f64 = 5.0;

/// Read side of the feed consumed by the detector
pub trait PriceSource {
    /// Latest known price, `None` if the symbol is not tracked
    fn current_price(&self, symbol: &str) -> Option<f64>;
}

pub struct PriceFeed {
    symbols: Vec<String>,
    prices: HashMap<String, AtomicU64>,
}

impl PriceFeed {
    /// Start every symbol at a random price in [100, 1100)
    pub fn new_random<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rng = rand::thread_rng();
        Self::with_prices(
            symbols
                .into_iter()
                .map(|s| (s.into(), rng.gen_range(100.0..1100.0)))
                .collect::<Vec<_>>(),
        )
    }

    /// Start from explicit prices
    pub fn with_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut symbols = Vec::new();
        let mut map = HashMap::new();
        for (symbol, price) in prices {
            if map.insert(symbol.clone(), AtomicU64::new(price.to_bits())).is_none() {
                symbols.push(symbol);
            }
        }
        Self {
            symbols,
            prices: map,
        }
    }

    /// Overwrite a symbol's price. Returns false for untracked symbols.
    pub fn set_price(&self, symbol: &str, price: f64) -> bool {
        match self.prices.get(symbol) {
            Some(slot) => {
                slot.store(price.to_bits(), Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Apply one random perturbation to every symbol
    pub fn advance(&self) {
        let mut rng = rand::thread_rng();
        self.advance_with(&mut rng);
    }

    pub fn advance_with<R: Rng>(&self, rng: &mut R) {
        let timestamp = Local::now().format("%Y-%m-%d %I:%M:%S %p");

        for symbol in &self.symbols {
            let Some(slot) = self.prices.get(symbol) else {
                continue;
            };
            let fluctuation = (rng.gen::<f64>() - 0.5) * 2.0 * MAX_STEP;

            // Single writer per tick, but keep the update atomic for readers
            let update = slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some(next_price(f64::from_bits(bits), fluctuation).to_bits())
            });
            let new_price = match update {
                Ok(previous) => next_price(f64::from_bits(previous), fluctuation),
                // The closure never declines an update
                Err(current) => f64::from_bits(current),
            };

            log::debug!("{} - {} : ${:.2}", symbol, timestamp, new_price);
        }
    }

    /// Tracked symbols in insertion order
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

impl PriceSource for PriceFeed {
    fn current_price(&self, symbol: &str) -> Option<f64> {
        self.prices
            .get(symbol)
            .map(|slot| f64::from_bits(slot.load(Ordering::Acquire)))
    }
}

fn next_price(old: f64, fluctuation: f64) -> f64 {
    (old + fluctuation).max(MIN_PRICE)
}
