//! StorageEngine: owns the write connection and the read pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use tracing::info;

use refdata_core::config::StorageConfig;
use refdata_core::errors::RefdataResult;

use crate::migrations;
use crate::pool::{pragmas, ReadPool, WriteConnection};
use crate::to_storage_err;

/// The opened Timeline Store.
pub struct StorageEngine {
    writer: Arc<WriteConnection>,
    readers: Arc<ReadPool>,
    path: PathBuf,
}

impl StorageEngine {
    /// Open (creating if needed) the store described by `config`.
    pub fn open(config: &StorageConfig) -> RefdataResult<Self> {
        Self::open_at(&config.db_path, config.read_pool_size, config.busy_timeout_ms)
    }

    /// Open the store at `path`, apply pending migrations, then open readers.
    ///
    /// Migrations run on the raw connection before it is wrapped, so this is
    /// safe to call from inside an async runtime.
    pub fn open_at(path: &Path, read_pool_size: usize, busy_timeout_ms: u64) -> RefdataResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| to_storage_err(format!("open {}: {e}", path.display())))?;
        pragmas::apply_pragmas_with_timeout(&conn, busy_timeout_ms)?;
        let applied = migrations::run_migrations(&conn)?;
        if applied > 0 {
            info!(path = %path.display(), applied, "timeline store initialised");
        }

        let writer = Arc::new(WriteConnection::from_connection(conn));
        let readers = Arc::new(ReadPool::open_with_timeout(
            path,
            read_pool_size,
            busy_timeout_ms,
        )?);

        Ok(Self {
            writer,
            readers,
            path: path.to_path_buf(),
        })
    }

    pub fn writer(&self) -> Arc<WriteConnection> {
        Arc::clone(&self.writer)
    }

    pub fn readers(&self) -> Arc<ReadPool> {
        Arc::clone(&self.readers)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
