//! SQLite alert log - append-only `alerts` table

use super::alert::Alert;
use super::log_backend::{AlertLogBackend, AlertLogError};
use crate::sqlite_pragma::apply_optimized_pragmas;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteAlertLog {
    conn: Connection,
}

impl SqliteAlertLog {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, AlertLogError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AlertLogError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create database directory {}: {}", parent.display(), e),
                    ))
                })?;
            }
        }

        let conn = Connection::open(db_path.as_ref())?;
        apply_optimized_pragmas(&conn)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                strategy TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                reason TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_alerts_symbol ON alerts(symbol, id DESC)",
            [],
        )?;

        log::info!("✅ SQLite alert log initialized: {}", db_path.as_ref().display());

        Ok(Self { conn })
    }

    /// All alerts in emission order
    pub fn read_all(&self) -> Result<Vec<Alert>, AlertLogError> {
        let mut stmt = self
            .conn
            .prepare("SELECT symbol, strategy, timestamp, reason FROM alerts ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut alerts = Vec::new();
        for row in rows {
            let (symbol, strategy, timestamp, reason) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| AlertLogError::Database(format!("bad timestamp '{}': {}", timestamp, e)))?
                .with_timezone(&Utc);
            alerts.push(Alert {
                symbol,
                strategy,
                timestamp,
                reason,
            });
        }
        Ok(alerts)
    }
}

#[async_trait]
impl AlertLogBackend for SqliteAlertLog {
    async fn append(&mut self, alert: &Alert) -> Result<(), AlertLogError> {
        self.conn.execute(
            "INSERT INTO alerts (symbol, strategy, timestamp, reason) VALUES (?1, ?2, ?3, ?4)",
            params![
                alert.symbol,
                alert.strategy,
                alert.timestamp.to_rfc3339(),
                alert.reason,
            ],
        )?;

        log::debug!("✅ Alert persisted to SQLite: {} ({})", alert.symbol, alert.strategy);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), AlertLogError> {
        // Each insert autocommits
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_alert(symbol: &str) -> Alert {
        Alert::new(symbol, "% spike OR drop", Utc::now(), "Price drop by 11.20% in last 5 sec")
    }

    #[tokio::test]
    async fn test_sqlite_append_preserves_order() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("alerts.db");
        let mut log = SqliteAlertLog::new(&db_path).unwrap();

        for symbol in ["AAPL", "MSFT", "AAPL"] {
            log.append(&create_test_alert(symbol)).await.unwrap();
        }
        log.flush().await.unwrap();

        let alerts = log.read_all().unwrap();
        let symbols: Vec<&str> = alerts.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "AAPL"]);
        assert_eq!(alerts[0].reason, "Price drop by 11.20% in last 5 sec");
    }

    #[tokio::test]
    async fn test_reopen_keeps_previous_records() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("alerts.db");

        {
            let mut log = SqliteAlertLog::new(&db_path).unwrap();
            log.append(&create_test_alert("FIRST")).await.unwrap();
        }

        let mut log = SqliteAlertLog::new(&db_path).unwrap();
        log.append(&create_test_alert("SECOND")).await.unwrap();

        let count: i64 = Connection::open(&db_path)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(log.read_all().unwrap()[1].symbol, "SECOND");
    }
}
