//! As-of queries: what was believed at a knowledge instant.

use rusqlite::Connection;

use refdata_core::errors::RefdataResult;
use refdata_core::models::{AsOfQuery, TimelineRow};
use refdata_storage::queries::timeline_ops;

/// Rows with `knowledge_from <= K < knowledge_to`, optionally narrowed to
/// those valid at `V` and to a set of keys. Ordered by key, then
/// `valid_from`.
///
/// Without a valid instant every interval known at `K` is returned, so a
/// key may appear more than once.
pub fn execute_as_of(conn: &Connection, query: &AsOfQuery) -> RefdataResult<Vec<TimelineRow>> {
    timeline_ops::get_rows_as_of(
        conn,
        query.knowledge_time,
        query.valid_time,
        query.security_ids.as_deref(),
    )
}
