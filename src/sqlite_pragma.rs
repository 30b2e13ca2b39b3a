//! SQLite PRAGMA tuning shared by SQLite-backed writers

use rusqlite::Connection;

/// Apply WAL journaling and durability settings for an append-heavy table.
///
/// `synchronous = FULL` keeps every committed alert on disk if the process
/// dies right after the insert returns.
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        log::warn!("SQLite refused WAL journaling, running in '{}' mode", mode);
    }
    conn.pragma_update(None, "synchronous", "FULL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "wal_autocheckpoint", 1000)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}
