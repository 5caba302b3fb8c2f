//! The merge engine.
//!
//! `plan` decides what a fact does to a key's current rows without touching
//! storage; `apply` runs the plan inside one immediate transaction together
//! with the watermark gate and the invariant checks; `batch` drives many
//! facts under a single knowledge time.

pub mod apply;
pub mod batch;
pub mod invariants;
pub mod plan;

pub use apply::merge_fact;
pub use batch::merge_batch;
pub use plan::{plan_merge, MergePlan};
