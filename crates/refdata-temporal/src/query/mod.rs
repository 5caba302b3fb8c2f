//! Point-in-time reconstruction.

pub mod as_of;

pub use as_of::execute_as_of;
