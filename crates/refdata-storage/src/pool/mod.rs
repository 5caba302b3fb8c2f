//! Connection management: one serialized writer, a pool of read-only readers.

pub mod pragmas;
mod read_pool;
mod write_connection;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;
