//! Batch merges under one knowledge time.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};
use uuid::Uuid;

use refdata_core::errors::{RefdataError, RefdataResult};
use refdata_core::models::{Fact, MergeSummary};
use refdata_core::time::truncate_to_micros;
use refdata_storage::queries::watermark_ops;

use super::apply::merge_fact;

/// Merge `facts` one transaction at a time.
///
/// Facts are applied in event-time order (stable, so input order breaks
/// ties), which keeps the watermark from rejecting facts of the same load
/// against each other. Late facts are counted and skipped; any other error
/// stops the batch with every earlier merge already committed.
pub fn merge_batch(
    conn: &Connection,
    mut facts: Vec<Fact>,
    knowledge_time: DateTime<Utc>,
    allow_late: bool,
    watermark_name: &str,
) -> RefdataResult<MergeSummary> {
    let knowledge_time = truncate_to_micros(knowledge_time);
    let mut summary = MergeSummary::new(Uuid::new_v4().to_string(), knowledge_time);
    facts.sort_by(|a, b| a.event_time().cmp(&b.event_time()));

    for fact in &facts {
        match merge_fact(conn, fact, knowledge_time, allow_late, watermark_name) {
            Ok(outcome) => summary.record(&outcome, fact.event_time()),
            Err(RefdataError::WatermarkViolation {
                security_id,
                event_time,
                watermark,
            }) => {
                warn!(
                    run_id = %summary.run_id,
                    %security_id,
                    %event_time,
                    %watermark,
                    "late fact skipped"
                );
                summary.skipped_as_late += 1;
            }
            Err(err) => {
                warn!(
                    run_id = %summary.run_id,
                    security_id = fact.security_id(),
                    code = err.error_code(),
                    "batch aborted: {err}"
                );
                return Err(err);
            }
        }
    }

    if summary.watermark.is_none() {
        summary.watermark = watermark_ops::get_watermark(conn, watermark_name)?;
    }

    info!(
        run_id = %summary.run_id,
        processed = summary.processed,
        skipped_as_late = summary.skipped_as_late,
        inserted_rows = summary.inserted_rows,
        closed_rows = summary.closed_rows,
        "batch merged"
    );
    Ok(summary)
}
