//! v002: open-knowledge partial index and append-only guard triggers.
//!
//! Rows are never deleted. An update may only close an open `valid_to` or
//! `knowledge_to`, and `is_current` must always equal
//! `valid_to IS NULL AND knowledge_to IS NULL`.

use rusqlite::Connection;

use refdata_core::errors::RefdataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> RefdataResult<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_reference_data_open_knowledge
            ON reference_data(security_id, valid_from) WHERE knowledge_to IS NULL;

        CREATE TRIGGER IF NOT EXISTS reference_data_no_delete
        BEFORE DELETE ON reference_data
        BEGIN
            SELECT RAISE(ABORT, 'reference_data is append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS reference_data_insert_open_knowledge
        BEFORE INSERT ON reference_data
        WHEN NEW.knowledge_to IS NOT NULL
          OR NEW.is_current != (NEW.valid_to IS NULL)
        BEGIN
            SELECT RAISE(ABORT, 'reference_data rows must be inserted with open knowledge');
        END;

        CREATE TRIGGER IF NOT EXISTS reference_data_close_only
        BEFORE UPDATE ON reference_data
        WHEN NEW.id IS NOT OLD.id
          OR NEW.security_id IS NOT OLD.security_id
          OR NEW.attributes IS NOT OLD.attributes
          OR NEW.event_time IS NOT OLD.event_time
          OR NEW.valid_from IS NOT OLD.valid_from
          OR NEW.knowledge_from IS NOT OLD.knowledge_from
          OR (OLD.valid_to IS NOT NULL AND NEW.valid_to IS NOT OLD.valid_to)
          OR (OLD.knowledge_to IS NOT NULL AND NEW.knowledge_to IS NOT OLD.knowledge_to)
          OR NEW.is_current != (NEW.valid_to IS NULL AND NEW.knowledge_to IS NULL)
        BEGIN
            SELECT RAISE(ABORT, 'reference_data is append-only: only open boundaries may be closed');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
