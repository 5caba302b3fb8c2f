//! Timeline row operations on `reference_data`.
//!
//! The only mutations offered are `insert_row` and `close_knowledge`; the
//! v002 triggers refuse anything else at the database level.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};

use refdata_core::errors::{RefdataError, RefdataResult, StorageError};
use refdata_core::models::{Attributes, NewTimelineRow, TimelineRow};
use refdata_core::time::{format_opt_ts, format_ts, parse_ts};

use crate::to_storage_err;

const ROW_COLUMNS: &str = "id, security_id, attributes, event_time, valid_from, valid_to, \
                           knowledge_from, knowledge_to, is_current";

/// Rows for `security_id` whose knowledge is still open, ordered by `valid_from`.
pub fn get_current_rows(conn: &Connection, security_id: &str) -> RefdataResult<Vec<TimelineRow>> {
    let sql = format!(
        "SELECT {ROW_COLUMNS} FROM reference_data
         WHERE security_id = ?1 AND knowledge_to IS NULL
         ORDER BY valid_from, id"
    );
    collect_rows(conn, &sql, params![security_id])
}

/// Every row ever written for `security_id`, in insertion order.
pub fn get_rows_for_key(conn: &Connection, security_id: &str) -> RefdataResult<Vec<TimelineRow>> {
    let sql = format!(
        "SELECT {ROW_COLUMNS} FROM reference_data
         WHERE security_id = ?1
         ORDER BY id"
    );
    collect_rows(conn, &sql, params![security_id])
}

/// Latest `knowledge_from` recorded for `security_id`.
pub fn get_latest_knowledge_from(
    conn: &Connection,
    security_id: &str,
) -> RefdataResult<Option<DateTime<Utc>>> {
    let latest: Option<String> = conn
        .query_row(
            "SELECT MAX(knowledge_from) FROM reference_data WHERE security_id = ?1",
            params![security_id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    latest.as_deref().map(parse_ts).transpose()
}

/// Insert a new row with open knowledge. Returns its id.
pub fn insert_row(conn: &Connection, row: &NewTimelineRow) -> RefdataResult<i64> {
    let attributes = row.attributes.to_json()?;
    conn.execute(
        "INSERT INTO reference_data (
            security_id, attributes, event_time, valid_from, valid_to,
            knowledge_from, knowledge_to, is_current
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
        params![
            row.security_id,
            attributes,
            format_ts(row.event_time),
            format_ts(row.valid_from),
            format_opt_ts(row.valid_to),
            format_ts(row.knowledge_from),
            row.is_current() as i64,
        ],
    )
    .map_err(|e| to_storage_err(format!("insert {}: {e}", row.security_id)))?;
    Ok(conn.last_insert_rowid())
}

/// Close an open `knowledge_to` at `knowledge_to`. Closing knowledge always
/// clears `is_current`.
///
/// Fails with `ConcurrentModification` if the row's knowledge was already closed.
pub fn close_knowledge(
    conn: &Connection,
    row_id: i64,
    knowledge_to: DateTime<Utc>,
) -> RefdataResult<()> {
    let changed = conn
        .execute(
            "UPDATE reference_data SET knowledge_to = ?2, is_current = 0
             WHERE id = ?1 AND knowledge_to IS NULL",
            params![row_id, format_ts(knowledge_to)],
        )
        .map_err(|e| to_storage_err(format!("close knowledge of row {row_id}: {e}")))?;
    if changed != 1 {
        return Err(StorageError::ConcurrentModification { row_id }.into());
    }
    Ok(())
}

/// Rows visible at `knowledge_time`, optionally pinned to `valid_time` and
/// restricted to `security_ids`, ordered by key then `valid_from`.
///
/// ```text
/// knowledge_from <= t_k AND (knowledge_to IS NULL OR t_k < knowledge_to)
/// valid_from     <= t_v AND (valid_to     IS NULL OR t_v < valid_to)
/// ```
pub fn get_rows_as_of(
    conn: &Connection,
    knowledge_time: DateTime<Utc>,
    valid_time: Option<DateTime<Utc>>,
    security_ids: Option<&[String]>,
) -> RefdataResult<Vec<TimelineRow>> {
    let mut values = vec![format_ts(knowledge_time)];
    let mut sql = format!(
        "SELECT {ROW_COLUMNS} FROM reference_data
         WHERE knowledge_from <= ?1 AND (knowledge_to IS NULL OR ?1 < knowledge_to)"
    );

    if let Some(valid_time) = valid_time {
        values.push(format_ts(valid_time));
        let p = values.len();
        sql.push_str(&format!(
            " AND valid_from <= ?{p} AND (valid_to IS NULL OR ?{p} < valid_to)"
        ));
    }

    if let Some(ids) = security_ids {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = ids
            .iter()
            .map(|id| {
                values.push(id.clone());
                format!("?{}", values.len())
            })
            .collect();
        sql.push_str(&format!(" AND security_id IN ({})", placeholders.join(", ")));
    }

    sql.push_str(" ORDER BY security_id, valid_from, id");
    collect_rows(conn, &sql, params_from_iter(values.iter()))
}

/// Total number of rows in the table.
pub fn count_rows(conn: &Connection) -> RefdataResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM reference_data", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

fn collect_rows<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RefdataResult<Vec<TimelineRow>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params, |row| Ok(parse_timeline_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let parsed = row.map_err(|e| to_storage_err(e.to_string()))??;
        results.push(parsed);
    }
    Ok(results)
}

/// Decode one `reference_data` row selected with `ROW_COLUMNS`.
pub fn parse_timeline_row(row: &Row<'_>) -> RefdataResult<TimelineRow> {
    let sql = |e: rusqlite::Error| to_storage_err(e.to_string());

    let row_id: i64 = row.get(0).map_err(sql)?;
    let corrupt = |reason: String| -> RefdataError {
        StorageError::CorruptRow { row_id, reason }.into()
    };
    let ts = |idx: usize| -> RefdataResult<DateTime<Utc>> {
        let raw: String = row.get(idx).map_err(sql)?;
        parse_ts(&raw).map_err(|e| corrupt(e.to_string()))
    };
    let opt_ts = |idx: usize| -> RefdataResult<Option<DateTime<Utc>>> {
        let raw: Option<String> = row.get(idx).map_err(sql)?;
        raw.as_deref()
            .map(|value| parse_ts(value).map_err(|e| corrupt(e.to_string())))
            .transpose()
    };

    let attributes_raw: String = row.get(2).map_err(sql)?;
    let attributes =
        Attributes::from_json(&attributes_raw).map_err(|e| corrupt(format!("attributes: {e}")))?;
    let is_current: i64 = row.get(8).map_err(sql)?;

    Ok(TimelineRow {
        row_id,
        security_id: row.get(1).map_err(sql)?,
        attributes,
        event_time: ts(3)?,
        valid_from: ts(4)?,
        valid_to: opt_ts(5)?,
        knowledge_from: ts(6)?,
        knowledge_to: opt_ts(7)?,
        is_current: is_current != 0,
    })
}
