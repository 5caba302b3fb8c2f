//! # refdata-temporal
//!
//! Bi-temporal merge engine for the reference data table.
//! Watermark gating, the four-way merge (insert, correction, append,
//! backfill split) plus gap fill, as-of reconstruction, and the
//! extract → transform → load stages that feed it.

pub mod engine;
pub mod merge;
pub mod pipeline;
pub mod query;
pub mod watermark;

pub use engine::BitemporalEngine;
