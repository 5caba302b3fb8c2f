/// Timeline Store errors. Any of these during a merge aborts the whole
/// transaction and surfaces as `RefdataError::TransactionFailure`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration v{version:03} failed: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("corrupt row {row_id}: {reason}")]
    CorruptRow { row_id: i64, reason: String },

    #[error("row {row_id} was closed by another writer")]
    ConcurrentModification { row_id: i64 },
}
