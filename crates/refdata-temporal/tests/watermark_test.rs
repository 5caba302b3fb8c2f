//! Watermark gating through the engine: late facts, equality, the
//! override path, and rollback of failed merges.

use chrono::{DateTime, Utc};
use serde_json::json;

use refdata_core::config::PipelineConfig;
use refdata_core::models::{Attributes, Fact, MergeCase};
use refdata_core::time::parse_ts;
use refdata_core::traits::IBitemporalEngine;
use refdata_storage::queries::{timeline_ops, watermark_ops};
use refdata_storage::StorageEngine;
use refdata_temporal::BitemporalEngine;

fn setup() -> (tempfile::TempDir, StorageEngine, BitemporalEngine) {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageEngine::open_at(&dir.path().join("watermark_test.db"), 2, 1_000).unwrap();
    let engine = BitemporalEngine::from_storage(&storage, PipelineConfig::default());
    (dir, storage, engine)
}

fn t(s: &str) -> DateTime<Utc> {
    parse_ts(s).unwrap()
}

fn fact(key: &str, event: &str, value: &str) -> Fact {
    let attrs = Attributes::new().with("status", json!(value)).unwrap();
    Fact::new(key, attrs, t(event)).unwrap()
}

fn row_count(storage: &StorageEngine) -> i64 {
    storage.readers().with_conn(timeline_ops::count_rows).unwrap()
}

#[tokio::test]
async fn watermark_created_on_first_merge() {
    let (_dir, _storage, engine) = setup();
    assert_eq!(engine.watermark().await.unwrap(), None);
    engine.merge(fact("EQ1", "2025-01-01", "ACTIVE"), t("2025-01-02"), false).await.unwrap();
    assert_eq!(engine.watermark().await.unwrap(), Some(t("2025-01-01")));
}

#[tokio::test]
async fn late_fact_is_rejected_without_override() {
    let (_dir, storage, engine) = setup();
    engine.merge(fact("EQ1", "2025-02-01", "ACTIVE"), t("2025-02-02"), false).await.unwrap();
    let before = row_count(&storage);

    let err = engine
        .merge(fact("EQ1", "2025-01-01", "CORRECTED"), t("2025-02-05"), false)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "WATERMARK_VIOLATION");
    assert_eq!(row_count(&storage), before);
    assert_eq!(engine.watermark().await.unwrap(), Some(t("2025-02-01")));
}

#[tokio::test]
async fn watermark_prevents_unintentional_reprocessing() {
    let (_dir, storage, engine) = setup();
    engine.merge(fact("EQ1", "2025-02-01", "ACTIVE"), t("2025-02-02"), false).await.unwrap();

    let skipped = engine
        .merge_batch(vec![fact("EQ1", "2025-01-01", "CORRECTED")], t("2025-03-01"), false)
        .await
        .unwrap();
    assert_eq!(skipped.skipped_as_late, 1);
    assert_eq!(skipped.inserted_rows, 0);
    assert_eq!(skipped.watermark, Some(t("2025-02-01")));
    assert_eq!(row_count(&storage), 1);

    let applied = engine
        .merge_batch(vec![fact("EQ1", "2025-01-01", "CORRECTED")], t("2025-04-01"), true)
        .await
        .unwrap();
    assert_eq!(applied.processed, 1);
    assert_eq!(applied.count(MergeCase::GapFill), 1);
    assert_eq!(applied.inserted_rows, 1);
    assert_eq!(engine.watermark().await.unwrap(), Some(t("2025-02-01")));
}

#[tokio::test]
async fn event_equal_to_watermark_is_not_late() {
    let (_dir, _storage, engine) = setup();
    engine.merge(fact("EQ1", "2025-01-01", "ACTIVE"), t("2025-01-02"), false).await.unwrap();
    let outcome = engine
        .merge(fact("EQ1", "2025-01-01", "CORRECTED"), t("2025-02-01"), false)
        .await
        .unwrap();
    assert_eq!(outcome.case, MergeCase::Correction);
    assert_eq!(outcome.watermark, t("2025-01-01"));
}

#[tokio::test]
async fn watermark_is_shared_across_keys() {
    let (_dir, _storage, engine) = setup();
    engine.merge(fact("A", "2025-03-01", "a"), t("2025-03-02"), false).await.unwrap();
    let err = engine
        .merge(fact("B", "2025-02-01", "b"), t("2025-03-03"), false)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "WATERMARK_VIOLATION");
}

#[tokio::test]
async fn override_can_move_watermark_backwards() {
    let (_dir, _storage, engine) = setup();
    engine.merge(fact("A", "2025-03-01", "a"), t("2025-03-02"), false).await.unwrap();

    engine.override_watermark(t("2025-01-01")).await.unwrap();
    assert_eq!(engine.watermark().await.unwrap(), Some(t("2025-01-01")));

    engine.merge(fact("B", "2025-02-01", "b"), t("2025-03-03"), false).await.unwrap();
    assert_eq!(engine.watermark().await.unwrap(), Some(t("2025-02-01")));
}

#[tokio::test]
async fn noop_still_advances_watermark() {
    let (_dir, _storage, engine) = setup();
    engine.merge(fact("A", "2025-03-01", "a"), t("2025-03-02"), false).await.unwrap();
    engine.override_watermark(t("2025-01-01")).await.unwrap();

    let outcome = engine
        .merge(fact("A", "2025-03-01", "a"), t("2025-03-05"), false)
        .await
        .unwrap();
    assert!(outcome.is_noop());
    assert_eq!(outcome.watermark, t("2025-03-01"));
}

#[tokio::test]
async fn named_watermarks_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageEngine::open_at(&dir.path().join("named.db"), 1, 1_000).unwrap();
    let daily = BitemporalEngine::from_storage(
        &storage,
        PipelineConfig {
            watermark_name: "daily".into(),
            ..PipelineConfig::default()
        },
    );
    daily.merge(fact("A", "2025-03-01", "a"), t("2025-03-02"), false).await.unwrap();

    let default_mark = storage
        .readers()
        .with_conn(|conn| watermark_ops::get_watermark(conn, "event_time"))
        .unwrap();
    assert_eq!(default_mark, None);
    assert_eq!(daily.watermark().await.unwrap(), Some(t("2025-03-01")));
}
