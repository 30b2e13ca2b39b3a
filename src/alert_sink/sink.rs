//! Alert sink: in-memory history plus durable append log
//!
//! `emit` never fails from the caller's point of view. The history is updated
//! first and is never held up by log I/O; log appends that fail stay queued and
//! are retried in order on the next emit or flush.

use super::alert::Alert;
use super::history::{AlertHistory, HISTORY_CAPACITY};
use super::log_backend::AlertLogBackend;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Alerts waiting for a successful durable append before the oldest is dropped
pub const MAX_LOG_BACKLOG: usize = 1024;

struct Pending {
    history: AlertHistory,
    backlog: VecDeque<(u64, Alert)>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct SinkStats {
    pub emitted: AtomicU64,
    pub persisted: AtomicU64,
    pub log_failures: AtomicU64,
    pub dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkStatsSnapshot {
    pub emitted: u64,
    pub persisted: u64,
    pub log_failures: u64,
    pub dropped: u64,
}

pub struct AlertSink {
    pending: Mutex<Pending>,
    log: tokio::sync::Mutex<Box<dyn AlertLogBackend>>,
    stats: SinkStats,
}

impl AlertSink {
    pub fn new(log: Box<dyn AlertLogBackend>) -> Self {
        log::info!("📊 Alert log backend: {}", log.backend_type());
        Self {
            pending: Mutex::new(Pending {
                history: AlertHistory::new(),
                backlog: VecDeque::new(),
                next_seq: 0,
            }),
            log: tokio::sync::Mutex::new(log),
            stats: SinkStats::default(),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an alert in the history and append it to the durable log
    pub async fn emit(&self, alert: Alert) {
        {
            let mut pending = self.pending();
            pending.history.push(alert.clone());

            let seq = pending.next_seq;
            pending.next_seq += 1;
            pending.backlog.push_back((seq, alert));

            while pending.backlog.len() > MAX_LOG_BACKLOG {
                if let Some((_, lost)) = pending.backlog.pop_front() {
                    self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                    log::error!(
                        "❌ Alert log backlog full, dropping unpersisted alert for {} at {}",
                        lost.symbol,
                        lost.timestamp
                    );
                }
            }
        }
        self.stats.emitted.fetch_add(1, Ordering::Relaxed);

        self.drain_backlog().await;
    }

    /// Append queued alerts in emission order, stopping at the first failure
    async fn drain_backlog(&self) {
        let mut log = self.log.lock().await;

        loop {
            let next = self.pending().backlog.front().cloned();
            let Some((seq, alert)) = next else {
                break;
            };

            match log.append(&alert).await {
                Ok(()) => {
                    let mut pending = self.pending();
                    if pending.backlog.front().map(|(s, _)| *s) == Some(seq) {
                        pending.backlog.pop_front();
                    }
                    self.stats.persisted.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.stats.log_failures.fetch_add(1, Ordering::Relaxed);
                    log::error!(
                        "❌ Failed to write alert to {} log ({} queued for retry): {}",
                        log.backend_type(),
                        self.pending().backlog.len(),
                        e
                    );
                    break;
                }
            }
        }
    }

    /// Retry anything still queued and flush the backend
    pub async fn flush(&self) {
        self.drain_backlog().await;

        let mut log = self.log.lock().await;
        if let Err(e) = log.flush().await {
            self.stats.log_failures.fetch_add(1, Ordering::Relaxed);
            log::error!("❌ Failed to flush {} alert log: {}", log.backend_type(), e);
        }
    }

    /// First `min(n, len)` alerts, newest first. `n` is capped at the history size.
    pub fn recent(&self, n: usize) -> Vec<Alert> {
        self.pending().history.recent(n.min(HISTORY_CAPACITY))
    }

    pub fn history_len(&self) -> usize {
        self.pending().history.len()
    }

    /// Alerts not yet durably written
    pub fn backlog_len(&self) -> usize {
        self.pending().backlog.len()
    }

    pub fn stats(&self) -> SinkStatsSnapshot {
        SinkStatsSnapshot {
            emitted: self.stats.emitted.load(Ordering::Relaxed),
            persisted: self.stats.persisted.load(Ordering::Relaxed),
            log_failures: self.stats.log_failures.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
        }
    }
}
