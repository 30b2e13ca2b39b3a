//! Spike / drop detection over a trailing time window
//!
//! The baseline is the oldest sample still inside the window, which
//! approximates "% change over the last W seconds" without a fixed-size buffer
//! and copes with irregular tick spacing.

use super::state::{PriceSample, SpikeWindow};
use crate::alert_sink::{Alert, SPIKE_LABEL};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Spike,
    Drop,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Spike => "spike",
            Direction::Drop => "drop",
        }
    }
}

/// `window_secs` as a chrono duration, millisecond precision
pub fn window_duration(window_secs: f64) -> Duration {
    Duration::milliseconds((window_secs * 1000.0).round() as i64)
}

/// Record `price` and alert if it moved more than `threshold_percent`
/// relative to the oldest in-window sample.
pub fn evaluate_spike(
    symbol: &str,
    price: f64,
    now: DateTime<Utc>,
    window_secs: f64,
    threshold_percent: f64,
    window: &mut SpikeWindow,
) -> Option<Alert> {
    window.push(PriceSample {
        price,
        observed_at: now,
    });
    window.evict_before(now, window_duration(window_secs));

    let old_price = window.oldest().map(|s| s.price).unwrap_or(price);
    if old_price <= 0.0 {
        log::debug!("{}: non-positive baseline {} in spike window, skipping", symbol, old_price);
        return None;
    }

    let change_percent = ((price - old_price) / old_price).abs() * 100.0;
    if change_percent <= threshold_percent {
        return None;
    }

    let direction = if price > old_price {
        Direction::Spike
    } else {
        Direction::Drop
    };

    let alert = Alert::new(
        symbol,
        SPIKE_LABEL,
        now,
        format!(
            "Price {} by {:.2}% in last {} sec",
            direction.as_str(),
            change_percent,
            window_secs
        ),
    );

    log::info!(
        "🚨 [ALERT - Spike] {} | {} | price changed by {:.2}%",
        alert.timestamp.format("%Y-%m-%d %I:%M:%S %p"),
        symbol,
        change_percent
    );

    Some(alert)
}
