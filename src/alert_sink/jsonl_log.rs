//! JSONL alert log - one alert per line, append-only

use super::alert::Alert;
use super::log_backend::{AlertLogBackend, AlertLogError};
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub struct JsonlAlertLog {
    file: File,
    path: PathBuf,
    records_written: u64,
}

impl JsonlAlertLog {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AlertLogError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        terminate_partial_record(&mut file)?;

        log::info!("📝 Appending alerts to: {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
            records_written: 0,
        })
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    fn write_record(&mut self, alert: &Alert) -> Result<(), AlertLogError> {
        let mut line = serde_json::to_string(alert)?;
        line.push('\n');

        // A failed write can leave a fragment behind; never glue a record onto it
        let start = terminate_partial_record(&mut self.file)?;

        if let Err(e) = self.file.write_all(line.as_bytes()).and_then(|_| self.file.flush()) {
            if let Err(rollback) = self.file.set_len(start) {
                log::warn!(
                    "Could not roll back partial alert record in {}: {}",
                    self.path.display(),
                    rollback
                );
            }
            return Err(e.into());
        }

        self.records_written += 1;
        Ok(())
    }
}

#[async_trait]
impl AlertLogBackend for JsonlAlertLog {
    async fn append(&mut self, alert: &Alert) -> Result<(), AlertLogError> {
        self.write_record(alert)
    }

    async fn flush(&mut self) -> Result<(), AlertLogError> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

/// Start a fresh line if the log ends mid-record. Returns the length the next
/// record starts at.
fn terminate_partial_record(file: &mut File) -> std::io::Result<u64> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;

    if last[0] != b'\n' {
        log::warn!("Alert log ends with a partial record, starting a new line");
        file.write_all(b"\n")?;
        return Ok(len + 1);
    }
    Ok(len)
}

/// Read every complete alert from a JSONL log, in emission order.
///
/// Lines that fail to parse (e.g. a record cut short by a crash) are skipped.
pub fn read_alert_log(path: impl AsRef<Path>) -> Result<Vec<Alert>, AlertLogError> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let mut alerts = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match Alert::from_jsonl(&line) {
            Ok(alert) => alerts.push(alert),
            Err(e) => {
                log::warn!(
                    "Skipping malformed alert record at {}:{}: {}",
                    path.as_ref().display(),
                    line_no + 1,
                    e
                );
            }
        }
    }

    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn create_test_alert(symbol: &str) -> Alert {
        Alert::new(symbol, "movingAverage", Utc::now(), "Price deviated by 12.50% from moving average")
    }

    #[tokio::test]
    async fn test_append_one_line_per_alert() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts_log.jsonl");
        let mut log = JsonlAlertLog::new(&path).unwrap();

        log.append(&create_test_alert("AAPL")).await.unwrap();
        log.append(&create_test_alert("MSFT")).await.unwrap();
        log.flush().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert_eq!(log.records_written(), 2);

        let alerts = read_alert_log(&path).unwrap();
        assert_eq!(alerts[0].symbol, "AAPL");
        assert_eq!(alerts[1].symbol, "MSFT");
    }

    #[tokio::test]
    async fn test_reopen_appends_without_rewriting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("alerts_log.jsonl");

        {
            let mut log = JsonlAlertLog::new(&path).unwrap();
            log.append(&create_test_alert("FIRST")).await.unwrap();
        }
        {
            let mut log = JsonlAlertLog::new(&path).unwrap();
            log.append(&create_test_alert("SECOND")).await.unwrap();
        }

        let symbols: Vec<String> = read_alert_log(&path)
            .unwrap()
            .into_iter()
            .map(|a| a.symbol)
            .collect();
        assert_eq!(symbols, vec!["FIRST", "SECOND"]);
    }

    #[tokio::test]
    async fn test_truncated_trailing_record_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts_log.jsonl");

        let mut log = JsonlAlertLog::new(&path).unwrap();
        log.append(&create_test_alert("AAPL")).await.unwrap();
        drop(log);

        // Simulate a crash halfway through the next record
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"symbol":"MSFT","strategy":"mov"#).unwrap();
        drop(file);

        let alerts = read_alert_log(&path).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].symbol, "AAPL");

        // Restart: the next record must not be glued onto the partial one
        let mut log = JsonlAlertLog::new(&path).unwrap();
        log.append(&create_test_alert("GOOG")).await.unwrap();

        let symbols: Vec<String> = read_alert_log(&path)
            .unwrap()
            .into_iter()
            .map(|a| a.symbol)
            .collect();
        assert_eq!(symbols, vec!["AAPL", "GOOG"]);
    }

    #[tokio::test]
    async fn test_fragment_from_failed_write_does_not_swallow_retry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts_log.jsonl");
        let mut log = JsonlAlertLog::new(&path).unwrap();

        log.append(&create_test_alert("A")).await.unwrap();

        // Bytes left behind by a write that failed halfway, on the same handle
        log.file.write_all(br#"{"symbol":"B","str"#).unwrap();

        // The sink retries B, then moves on to C
        log.append(&create_test_alert("B")).await.unwrap();
        log.append(&create_test_alert("C")).await.unwrap();

        let symbols: Vec<String> = read_alert_log(&path)
            .unwrap()
            .into_iter()
            .map(|a| a.symbol)
            .collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
        assert_eq!(log.records_written(), 3);
    }
}
