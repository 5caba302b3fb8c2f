//! Watermark row operations on `pipeline_watermarks`.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use refdata_core::errors::RefdataResult;
use refdata_core::time::{format_ts, parse_ts};

use crate::to_storage_err;

/// Current value of the named watermark, if one has been written.
pub fn get_watermark(conn: &Connection, name: &str) -> RefdataResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM pipeline_watermarks WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    raw.as_deref()
        .map(|value| {
            parse_ts(value).map_err(|e| to_storage_err(format!("watermark {name:?}: {e}")))
        })
        .transpose()
}

/// Move the watermark to `max(current, candidate)` and return the result.
/// Creates the row on first use. Never moves it backwards.
pub fn advance_watermark(
    conn: &Connection,
    name: &str,
    candidate: DateTime<Utc>,
) -> RefdataResult<DateTime<Utc>> {
    conn.execute(
        "INSERT INTO pipeline_watermarks (name, value, updated_at)
         VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         ON CONFLICT(name) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            WHERE excluded.value > pipeline_watermarks.value",
        params![name, format_ts(candidate)],
    )
    .map_err(|e| to_storage_err(format!("advance watermark {name:?}: {e}")))?;

    get_watermark(conn, name)?.ok_or_else(|| {
        to_storage_err(format!("watermark {name:?} missing after upsert"))
    })
}

/// Set the watermark unconditionally. Administrative path only.
pub fn override_watermark(
    conn: &Connection,
    name: &str,
    value: DateTime<Utc>,
) -> RefdataResult<()> {
    conn.execute(
        "INSERT INTO pipeline_watermarks (name, value, updated_at)
         VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         ON CONFLICT(name) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at",
        params![name, format_ts(value)],
    )
    .map_err(|e| to_storage_err(format!("override watermark {name:?}: {e}")))?;
    Ok(())
}
