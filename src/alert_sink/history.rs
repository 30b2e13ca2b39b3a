//! Bounded newest-first alert history

use super::alert::Alert;
use std::collections::VecDeque;

/// Number of alerts retained in memory and served by the query boundary
pub const HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity history. Index 0 is always the newest alert.
#[derive(Debug, Clone)]
pub struct AlertHistory {
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl AlertHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert at the front and evict from the back until within capacity
    pub fn push(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
        self.alerts.truncate(self.capacity);
    }

    /// First `min(n, len)` alerts, newest first
    pub fn recent(&self, n: usize) -> Vec<Alert> {
        self.alerts.iter().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl Default for AlertHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn alert(n: usize) -> Alert {
        Alert::new(format!("SYM{}", n), "movingAverage", Utc::now(), format!("alert {}", n))
    }

    #[test]
    fn test_empty_history() {
        let history = AlertHistory::new();
        assert!(history.is_empty());
        assert!(history.recent(10).is_empty());
    }

    #[test]
    fn test_newest_first() {
        let mut history = AlertHistory::new();
        history.push(alert(1));
        history.push(alert(2));
        history.push(alert(3));

        let recent = history.recent(10);
        let symbols: Vec<&str> = recent.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SYM3", "SYM2", "SYM1"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = AlertHistory::new();
        for i in 0..25 {
            history.push(alert(i));
            assert!(history.len() <= HISTORY_CAPACITY);
        }

        let recent = history.recent(HISTORY_CAPACITY);
        assert_eq!(recent.len(), HISTORY_CAPACITY);
        assert_eq!(recent[0].symbol, "SYM24");
        assert_eq!(recent[9].symbol, "SYM15");
    }

    #[test]
    fn test_recent_limit() {
        let mut history = AlertHistory::new();
        for i in 0..4 {
            history.push(alert(i));
        }

        assert_eq!(history.recent(2).len(), 2);
        assert_eq!(history.recent(2)[0].symbol, "SYM3");
        assert_eq!(history.recent(50).len(), 4);
        assert!(history.recent(0).is_empty());
    }
}
