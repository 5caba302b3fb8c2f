//! # refdata-storage
//!
//! SQLite persistence layer for the bi-temporal reference data table.
//! Single write connection + read pool (WAL mode), forward-only migrations,
//! raw SQL for timeline rows and watermarks.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod transaction;

pub use engine::StorageEngine;

/// Helper to convert a string message into a `RefdataError::TransactionFailure`.
pub fn to_storage_err(msg: String) -> refdata_core::RefdataError {
    refdata_core::RefdataError::TransactionFailure(refdata_core::StorageError::SqliteError {
        message: msg,
    })
}
