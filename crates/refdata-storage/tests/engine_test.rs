//! File-backed StorageEngine: writer/reader wiring and reader isolation.

use serde_json::json;

use refdata_core::config::StorageConfig;
use refdata_core::models::{Attributes, NewTimelineRow};
use refdata_core::time::parse_ts;
use refdata_storage::migrations::{current_version, LATEST_VERSION};
use refdata_storage::queries::timeline_ops;
use refdata_storage::StorageEngine;

fn open_engine() -> (tempfile::TempDir, StorageEngine) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        db_path: dir.path().join("engine_test.db"),
        read_pool_size: 2,
        busy_timeout_ms: 1_000,
    };
    let engine = StorageEngine::open(&config).unwrap();
    (dir, engine)
}

fn row(key: &str) -> NewTimelineRow {
    NewTimelineRow {
        security_id: key.to_string(),
        attributes: Attributes::from_pairs([("status", json!("ACTIVE"))]).unwrap(),
        event_time: parse_ts("2025-01-01").unwrap(),
        valid_from: parse_ts("2025-01-01").unwrap(),
        valid_to: None,
        knowledge_from: parse_ts("2025-01-05").unwrap(),
    }
}

#[tokio::test]
async fn writes_are_visible_to_pooled_readers() {
    let (_dir, engine) = open_engine();
    let writer = engine.writer();
    writer
        .with_conn(|conn| timeline_ops::insert_row(conn, &row("EQ1")))
        .await
        .unwrap();

    let readers = engine.readers();
    assert_eq!(readers.size(), 2);
    for _ in 0..readers.size() {
        let count = readers.with_conn(timeline_ops::count_rows).unwrap();
        assert_eq!(count, 1);
    }
}

#[tokio::test]
async fn readers_cannot_write() {
    let (_dir, engine) = open_engine();
    let result = engine
        .readers()
        .with_conn(|conn| timeline_ops::insert_row(conn, &row("EQ1")));
    assert!(result.is_err());
}

#[test]
fn reopening_keeps_data_and_schema() {
    let (dir, engine) = open_engine();
    engine
        .writer()
        .with_conn_sync(|conn| timeline_ops::insert_row(conn, &row("EQ1")))
        .unwrap();
    let path = engine.path().to_path_buf();
    drop(engine);

    let reopened = StorageEngine::open_at(&path, 1, 1_000).unwrap();
    let (version, count) = reopened
        .readers()
        .with_conn(|conn| Ok((current_version(conn)?, timeline_ops::count_rows(conn)?)))
        .unwrap();
    assert_eq!(version, LATEST_VERSION);
    assert_eq!(count, 1);
    drop(dir);
}
