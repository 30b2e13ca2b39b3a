//! Tickwatch Binary - price feed, anomaly detector and alert query endpoint
//!
//! ## Usage
//!
//! ```bash
//! ALERT_API_TOKEN=changeme cargo run --release --bin tickwatch
//! ```
//!
//! ## Environment Variables
//!
//! - TICKWATCH_SYMBOLS_PATH - Symbol strategy file (default: config.json)
//! - PRICE_INTERVAL_MS - Price feed advance interval (default: 1000)
//! - DETECTION_INTERVAL_MS - Detection pass interval (default: 1000)
//! - ALERT_LOG_BACKEND - `jsonl` or `sqlite` (default: jsonl)
//! - ALERT_LOG_PATH - Durable alert log path (default: alerts_log.jsonl / alerts.db)
//! - ALERT_API_BIND - Query endpoint address (default: 127.0.0.1:3000)
//! - ALERT_API_TOKEN - Bearer token; the query endpoint is disabled when unset
//! - RUST_LOG - Logging level (optional, default: info)

use std::sync::Arc;
use tickwatch::alert_sink::{AlertLogWriter, AlertSink};
use tickwatch::detector_core::{detection_scheduler_task, price_scheduler_task, AnomalyDetector, SymbolTable};
use tickwatch::feed::PriceFeed;
use tickwatch::{query, RuntimeConfig};
use tokio::sync::{watch, Mutex};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = RuntimeConfig::from_env()?;

    log::info!("🚀 Starting Tickwatch");
    log::info!("   Symbols: {}", config.symbols_path.display());
    log::info!("   Price interval: {}ms", config.price_interval_ms);
    log::info!("   Detection interval: {}ms", config.detection_interval_ms);
    log::info!("   Alert log: {} ({:?})", config.log_path.display(), config.log_backend);

    let symbols = SymbolTable::load(&config.symbols_path)?;
    if symbols.is_empty() {
        return Err(format!("No symbols configured in {}", config.symbols_path.display()).into());
    }
    if symbols.evaluated_count() == 0 {
        log::warn!("⚠️  No symbol has a usable strategy, no alerts will be raised");
    }

    let feed = Arc::new(PriceFeed::new_random(symbols.symbols()));
    let writer = AlertLogWriter::new(config.log_backend, &config.log_path)?;
    let sink = Arc::new(AlertSink::new(Box::new(writer)));
    let detector = Arc::new(Mutex::new(AnomalyDetector::new(
        symbols,
        feed.clone(),
        sink.clone(),
    )));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let price_handle = tokio::spawn(price_scheduler_task(
        feed.clone(),
        config.price_interval_ms,
        shutdown_rx.clone(),
    ));
    let detection_handle = tokio::spawn(detection_scheduler_task(
        detector.clone(),
        config.detection_interval_ms,
        shutdown_rx.clone(),
    ));

    let query_handle = match config.api_token.as_deref() {
        Some(token) => {
            let listener = tokio::net::TcpListener::bind(&config.api_bind).await?;
            let router = query::create_router(sink.clone(), token);
            let shutdown = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = query::serve(listener, router, shutdown).await {
                    log::error!("❌ Alert query endpoint failed: {}", e);
                }
            }))
        }
        None => {
            log::warn!("⚠️  ALERT_API_TOKEN not set, alert query endpoint disabled");
            None
        }
    };

    log::info!("✅ Tickwatch running - press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    log::info!("🛑 Shutdown requested, finishing in-flight ticks...");
    let _ = shutdown_tx.send(true);

    if let Err(e) = price_handle.await {
        log::error!("Price scheduler ended abnormally: {}", e);
    }
    if let Err(e) = detection_handle.await {
        log::error!("Detection scheduler ended abnormally: {}", e);
    }
    if let Some(handle) = query_handle {
        let _ = handle.await;
    }

    sink.flush().await;

    let stats = sink.stats();
    log::info!(
        "👋 Tickwatch stopped: {} alerts emitted, {} persisted, {} log failures, {} dropped",
        stats.emitted,
        stats.persisted,
        stats.log_failures,
        stats.dropped
    );

    Ok(())
}
