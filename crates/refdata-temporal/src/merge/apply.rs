//! Transactional application of a merge plan.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

use refdata_core::errors::RefdataResult;
use refdata_core::models::{Fact, MergeOutcome};
use refdata_core::time::truncate_to_micros;
use refdata_storage::queries::{timeline_ops, watermark_ops};
use refdata_storage::transaction::with_immediate_transaction;

use super::invariants;
use super::plan::plan_merge;
use crate::watermark::WatermarkGate;

/// Merge one fact under `knowledge_time`.
///
/// Everything happens in a single `BEGIN IMMEDIATE` transaction, in order:
/// load current rows, check the no-overlap invariant, gate on the watermark,
/// check knowledge ordering, plan, close superseded rows, insert new rows,
/// advance the watermark. Any failure rolls the whole merge back, so the
/// watermark never moves for a fact that was not committed.
pub fn merge_fact(
    conn: &Connection,
    fact: &Fact,
    knowledge_time: DateTime<Utc>,
    allow_late: bool,
    watermark_name: &str,
) -> RefdataResult<MergeOutcome> {
    let knowledge_time = truncate_to_micros(knowledge_time);
    let security_id = fact.security_id();

    with_immediate_transaction(conn, |conn| {
        let current = timeline_ops::get_current_rows(conn, security_id)?;
        invariants::check_current_rows(security_id, &current)?;

        let watermark = watermark_ops::get_watermark(conn, watermark_name)?;
        WatermarkGate::enforce(security_id, watermark, fact.event_time(), allow_late)?;

        let latest = timeline_ops::get_latest_knowledge_from(conn, security_id)?;
        invariants::check_knowledge_order(security_id, latest, knowledge_time)?;

        let plan = plan_merge(&current, fact, knowledge_time);
        debug!(
            security_id,
            case = plan.case.as_str(),
            supersede = plan.supersede.len(),
            insert = plan.insert.len(),
            "merge planned"
        );

        let mut closed_row_ids = Vec::with_capacity(plan.supersede.len());
        for row_id in plan.supersede {
            timeline_ops::close_knowledge(conn, row_id, knowledge_time)?;
            closed_row_ids.push(row_id);
        }

        let mut inserted_row_ids = Vec::with_capacity(plan.insert.len());
        for row in &plan.insert {
            inserted_row_ids.push(timeline_ops::insert_row(conn, row)?);
        }

        let watermark = watermark_ops::advance_watermark(conn, watermark_name, fact.event_time())?;

        Ok(MergeOutcome {
            security_id: security_id.to_string(),
            case: plan.case,
            closed_row_ids,
            inserted_row_ids,
            watermark,
        })
    })
}
