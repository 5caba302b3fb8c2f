//! v001: schema version tracking, the bi-temporal reference table, watermarks.

use rusqlite::Connection;

use refdata_core::errors::RefdataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> RefdataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS reference_data (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            security_id    TEXT NOT NULL CHECK (length(security_id) > 0),
            attributes     TEXT NOT NULL,
            event_time     TEXT NOT NULL,
            valid_from     TEXT NOT NULL,
            valid_to       TEXT,
            knowledge_from TEXT NOT NULL,
            knowledge_to   TEXT,
            is_current     INTEGER NOT NULL DEFAULT 0 CHECK (is_current IN (0, 1)),
            CHECK (valid_to IS NULL OR valid_from <= valid_to),
            CHECK (knowledge_to IS NULL OR knowledge_from <= knowledge_to)
        );

        CREATE INDEX IF NOT EXISTS idx_reference_data_entity_valid
            ON reference_data(security_id, valid_from);
        CREATE INDEX IF NOT EXISTS idx_reference_data_current
            ON reference_data(security_id, is_current);
        CREATE INDEX IF NOT EXISTS idx_reference_data_knowledge
            ON reference_data(knowledge_from, knowledge_to);

        CREATE TABLE IF NOT EXISTS pipeline_watermarks (
            name       TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
