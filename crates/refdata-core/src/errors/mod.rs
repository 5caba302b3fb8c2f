mod refdata_error;
mod storage_error;

pub use refdata_error::{RefdataError, RefdataResult};
pub use storage_error::StorageError;
