//! Schedulers for the two independent periodic activities
//!
//! The price scheduler advances the feed and the detection scheduler runs
//! detection passes. They share nothing but the feed, so a detection pass may
//! see zero, one or several price updates since the previous pass.

use super::detector::AnomalyDetector;
use crate::feed::PriceFeed;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Detection scheduler task - one detection pass per interval, never overlapping
///
/// Each pass runs in its own task and is awaited before the next tick is
/// armed; ticks that fall due while a pass is still running are skipped. A
/// pass that panics is reported and the loop carries on. Shutdown is only
/// observed between passes, so an in-flight pass always completes.
pub async fn detection_scheduler_task(
    detector: Arc<Mutex<AnomalyDetector>>,
    detection_interval_ms: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    log::info!("⏰ Starting detection scheduler (interval: {}ms)", detection_interval_ms);

    let mut timer = interval(Duration::from_millis(detection_interval_ms));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = shutdown.changed() => {}
        }
        if shutdown_requested(&shutdown) {
            break;
        }

        let detector = detector.clone();
        let pass = tokio::spawn(async move {
            let mut detector = detector.lock().await;
            detector.run_tick(Utc::now()).await
        });

        match pass.await {
            Ok(report) => {
                if !report.alerts.is_empty() || !report.failures.is_empty() {
                    log::info!(
                        "✅ Detection pass: {} alerts, {} symbol failures",
                        report.alerts.len(),
                        report.failures.len()
                    );
                }
            }
            Err(e) => {
                log::error!("❌ Detection pass aborted, next tick still scheduled: {}", e);
            }
        }
    }

    log::info!("Detection scheduler stopped");
}

/// Price scheduler task - advance every symbol's price once per interval
pub async fn price_scheduler_task(
    feed: Arc<PriceFeed>,
    price_interval_ms: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    log::info!("💰 Starting price scheduler (interval: {}ms)", price_interval_ms);

    let mut timer = interval(Duration::from_millis(price_interval_ms));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = shutdown.changed() => {}
        }
        if shutdown_requested(&shutdown) {
            break;
        }

        feed.advance();
    }

    log::info!("Price scheduler stopped");
}

/// Shutdown was signalled or the sender is gone
fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    let stop = *shutdown.borrow();
    stop || shutdown.has_changed().is_err()
}
