use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use refdata_core::errors::RefdataResult;

use super::pragmas;
use crate::to_storage_err;

/// Round-robin pool of read-only connections.
///
/// In WAL mode each statement reads one committed snapshot, so a query never
/// observes a merge half-applied.
pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn open_with_timeout(path: &Path, size: usize, busy_timeout_ms: u64) -> RefdataResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let mut conns = Vec::with_capacity(size.max(1));
        for _ in 0..size.max(1) {
            let conn = Connection::open_with_flags(path, flags)
                .map_err(|e| to_storage_err(format!("open reader {}: {e}", path.display())))?;
            pragmas::apply_read_pragmas(&conn, busy_timeout_ms)?;
            conns.push(Mutex::new(conn));
        }
        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.conns.len()
    }

    /// Run `f` on the next reader in rotation.
    pub fn with_conn<F, T>(&self, f: F) -> RefdataResult<T>
    where
        F: FnOnce(&Connection) -> RefdataResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let guard = self.conns[idx]
            .lock()
            .map_err(|_| to_storage_err(format!("reader {idx} mutex poisoned")))?;
        f(&guard)
    }
}
