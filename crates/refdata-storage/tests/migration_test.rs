//! Schema creation, idempotent re-runs, and the append-only guards.

use rusqlite::{params, Connection};

use refdata_storage::migrations::{current_version, run_migrations, LATEST_VERSION};
use refdata_storage::pool::pragmas;

fn raw_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    pragmas::apply_pragmas_with_timeout(&conn, 1_000).unwrap();
    run_migrations(&conn).unwrap();
    conn
}

fn insert_open_row(conn: &Connection, security_id: &str) -> i64 {
    conn.execute(
        "INSERT INTO reference_data (security_id, attributes, event_time, valid_from, valid_to,
                                     knowledge_from, knowledge_to, is_current)
         VALUES (?1, '{}', '2025-01-01T00:00:00.000000Z', '2025-01-01T00:00:00.000000Z', NULL,
                 '2025-01-10T00:00:00.000000Z', NULL, 1)",
        params![security_id],
    )
    .unwrap();
    conn.last_insert_rowid()
}

#[test]
fn fresh_database_reaches_latest_version() {
    let conn = Connection::open_in_memory().unwrap();
    assert_eq!(current_version(&conn).unwrap(), 0);
    let applied = run_migrations(&conn).unwrap();
    assert_eq!(applied, LATEST_VERSION);
    assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
}

#[test]
fn rerunning_migrations_is_a_noop() {
    let conn = raw_conn();
    assert_eq!(run_migrations(&conn).unwrap(), 0);
    assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
}

#[test]
fn failed_version_record_rolls_back_the_migration() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE schema_version (
             version    INTEGER PRIMARY KEY,
             applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         );
         CREATE TRIGGER refuse_v2 BEFORE INSERT ON schema_version
         WHEN NEW.version = 2
         BEGIN
             SELECT RAISE(ABORT, 'version 2 refused');
         END;",
    )
    .unwrap();

    let err = run_migrations(&conn).unwrap_err();
    assert_eq!(err.error_code(), "TRANSACTION_FAILURE");
    let message = err.to_string();
    assert!(message.contains("migration v002 failed"), "{message}");
    assert!(message.contains("version 2 refused"), "{message}");

    assert!(conn.is_autocommit());
    assert_eq!(current_version(&conn).unwrap(), 1);
    let guards: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'trigger' AND name = 'reference_data_no_delete'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(guards, 0);
}

#[test]
fn schema_has_exact_timeline_columns() {
    let conn = raw_conn();
    let mut stmt = conn.prepare("PRAGMA table_info(reference_data)").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .map(|c| c.unwrap())
        .collect();
    assert_eq!(
        columns,
        vec![
            "id",
            "security_id",
            "attributes",
            "event_time",
            "valid_from",
            "valid_to",
            "knowledge_from",
            "knowledge_to",
            "is_current",
        ]
    );
}

#[test]
fn delete_is_refused() {
    let conn = raw_conn();
    let id = insert_open_row(&conn, "EQ1");
    let err = conn
        .execute("DELETE FROM reference_data WHERE id = ?1", params![id])
        .unwrap_err();
    assert!(err.to_string().contains("append-only"), "{err}");
}

#[test]
fn closing_knowledge_is_allowed() {
    let conn = raw_conn();
    let id = insert_open_row(&conn, "EQ1");
    conn.execute(
        "UPDATE reference_data SET knowledge_to = '2025-02-01T00:00:00.000000Z', is_current = 0
         WHERE id = ?1",
        params![id],
    )
    .unwrap();
}

#[test]
fn rewriting_payload_is_refused() {
    let conn = raw_conn();
    let id = insert_open_row(&conn, "EQ1");
    let err = conn
        .execute(
            "UPDATE reference_data SET attributes = '{\"status\":\"X\"}' WHERE id = ?1",
            params![id],
        )
        .unwrap_err();
    assert!(err.to_string().contains("append-only"), "{err}");
}

#[test]
fn reopening_a_closed_boundary_is_refused() {
    let conn = raw_conn();
    let id = insert_open_row(&conn, "EQ1");
    conn.execute(
        "UPDATE reference_data SET knowledge_to = '2025-02-01T00:00:00.000000Z', is_current = 0
         WHERE id = ?1",
        params![id],
    )
    .unwrap();
    let err = conn
        .execute(
            "UPDATE reference_data SET knowledge_to = NULL, is_current = 1 WHERE id = ?1",
            params![id],
        )
        .unwrap_err();
    assert!(err.to_string().contains("append-only"), "{err}");
}

#[test]
fn is_current_must_stay_derived() {
    let conn = raw_conn();
    let id = insert_open_row(&conn, "EQ1");
    // Closing knowledge but leaving is_current = 1 contradicts the derivation.
    let err = conn
        .execute(
            "UPDATE reference_data SET knowledge_to = '2025-02-01T00:00:00.000000Z' WHERE id = ?1",
            params![id],
        )
        .unwrap_err();
    assert!(err.to_string().contains("append-only"), "{err}");
}

#[test]
fn insert_with_closed_knowledge_is_refused() {
    let conn = raw_conn();
    let err = conn
        .execute(
            "INSERT INTO reference_data (security_id, attributes, event_time, valid_from,
                                         knowledge_from, knowledge_to, is_current)
             VALUES ('EQ1', '{}', '2025-01-01T00:00:00.000000Z', '2025-01-01T00:00:00.000000Z',
                     '2025-01-10T00:00:00.000000Z', '2025-01-11T00:00:00.000000Z', 0)",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("open knowledge"), "{err}");
}

#[test]
fn inverted_valid_interval_violates_check() {
    let conn = raw_conn();
    let result = conn.execute(
        "INSERT INTO reference_data (security_id, attributes, event_time, valid_from, valid_to,
                                     knowledge_from, is_current)
         VALUES ('EQ1', '{}', '2025-02-01T00:00:00.000000Z', '2025-02-01T00:00:00.000000Z',
                 '2025-01-01T00:00:00.000000Z', '2025-01-10T00:00:00.000000Z', 0)",
        [],
    );
    assert!(result.is_err());
}
