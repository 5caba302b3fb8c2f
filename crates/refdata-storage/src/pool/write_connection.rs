use rusqlite::Connection;
use tokio::sync::Mutex;

use refdata_core::errors::RefdataResult;

/// The single write connection. Every merge goes through here, so merges are
/// serialized process-wide (and therefore per business key).
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Wrap an already-configured connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` with exclusive access to the connection.
    ///
    /// `f` runs to completion once the lock is held; dropping the returned
    /// future before that point leaves the database untouched.
    pub async fn with_conn<F, T>(&self, f: F) -> RefdataResult<T>
    where
        F: FnOnce(&Connection) -> RefdataResult<T>,
    {
        let guard = self.conn.lock().await;
        f(&guard)
    }

    /// Blocking variant for synchronous callers. Panics if called from
    /// inside a tokio runtime thread.
    pub fn with_conn_sync<F, T>(&self, f: F) -> RefdataResult<T>
    where
        F: FnOnce(&Connection) -> RefdataResult<T>,
    {
        let guard = self.conn.blocking_lock();
        f(&guard)
    }
}
