//! # refdata-core
//!
//! Shared types for the bi-temporal reference data store: facts and
//! attribute payloads, persisted timeline rows, merge outcomes, errors,
//! configuration, and the engine trait.

pub mod config;
pub mod errors;
pub mod models;
pub mod time;
pub mod traits;

pub use errors::{RefdataError, RefdataResult, StorageError};
