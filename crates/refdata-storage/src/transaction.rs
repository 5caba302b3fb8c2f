//! Immediate write transactions.

use rusqlite::Connection;
use tracing::warn;

use refdata_core::errors::RefdataResult;

use crate::to_storage_err;

/// Run `f` inside `BEGIN IMMEDIATE … COMMIT`.
///
/// The write lock is taken up front, so reads inside `f` (current rows,
/// watermark) cannot be invalidated by another writer before commit. Any
/// error from `f` or from `COMMIT` rolls everything back.
pub fn with_immediate_transaction<T, F>(conn: &Connection, f: F) -> RefdataResult<T>
where
    F: FnOnce(&Connection) -> RefdataResult<T>,
{
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(format!("begin transaction: {e}")))?;

    match f(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                rollback(conn);
                return Err(to_storage_err(format!("commit: {e}")));
            }
            Ok(value)
        }
        Err(err) => {
            rollback(conn);
            Err(err)
        }
    }
}

fn rollback(conn: &Connection) {
    if conn.is_autocommit() {
        return;
    }
    if let Err(e) = conn.execute_batch("ROLLBACK") {
        warn!("rollback failed: {e}");
    }
}
