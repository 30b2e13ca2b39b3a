//! Moving-average deviation detection

use super::state::MovingAverageWindow;
use crate::alert_sink::{Alert, MOVING_AVERAGE_LABEL};
use chrono::{DateTime, Utc};

/// Push `price` and, once the window holds exactly `sample_size` prices,
/// alert if it sits more than `deviation_percent` away from their mean.
pub fn evaluate_moving_average(
    symbol: &str,
    price: f64,
    now: DateTime<Utc>,
    deviation_percent: f64,
    window: &mut MovingAverageWindow,
) -> Option<Alert> {
    window.push(price);

    if !window.is_full() {
        return None;
    }

    let mean = window.mean()?;
    if mean <= 0.0 {
        log::debug!("{}: non-positive moving average {}, skipping", symbol, mean);
        return None;
    }

    let deviation = ((price - mean) / mean).abs() * 100.0;
    if deviation <= deviation_percent {
        return None;
    }

    let alert = Alert::new(
        symbol,
        MOVING_AVERAGE_LABEL,
        now,
        format!("Price deviated by {:.2}% from moving average", deviation),
    );

    log::info!(
        "🚨 [ALERT - Moving Avg] {} | {} | {}",
        alert.timestamp.format("%Y-%m-%d %I:%M:%S %p"),
        alert.symbol,
        alert.reason
    );

    Some(alert)
}
