//! Raw SQL for the Timeline Store.

pub mod timeline_ops;
pub mod watermark_ops;
