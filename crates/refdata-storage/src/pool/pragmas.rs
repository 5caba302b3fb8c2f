//! Connection pragmas.

use std::time::Duration;

use rusqlite::Connection;

use refdata_core::errors::RefdataResult;

use crate::to_storage_err;

/// Pragmas for the write connection.
pub fn apply_pragmas_with_timeout(conn: &Connection, busy_timeout_ms: u64) -> RefdataResult<()> {
    // In-memory databases answer "memory" here; that is fine.
    let _mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(|e| to_storage_err(format!("journal_mode: {e}")))?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| to_storage_err(format!("synchronous: {e}")))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| to_storage_err(format!("foreign_keys: {e}")))?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    Ok(())
}

/// Pragmas for pooled readers. `query_only` makes an accidental write fail loudly.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u64) -> RefdataResult<()> {
    conn.pragma_update(None, "query_only", "ON")
        .map_err(|e| to_storage_err(format!("query_only: {e}")))?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    Ok(())
}
