//! The two operations the binary exposes.

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use refdata_core::config::RefdataConfig;
use refdata_core::models::AsOfQuery;
use refdata_core::traits::IBitemporalEngine;
use refdata_temporal::pipeline::{run_pipeline, PipelineRequest};
use refdata_temporal::BitemporalEngine;

use crate::cli::{QueryArgs, RunArgs};

const EMPTY_SNAPSHOT: &str = "No records found for the provided snapshot.";

pub async fn run(config: &RefdataConfig, args: RunArgs) -> anyhow::Result<()> {
    let engine = BitemporalEngine::open(config).context("opening timeline store")?;
    let request = PipelineRequest {
        input: args.input,
        knowledge_time: args.knowledge_time.unwrap_or_else(Utc::now),
        allow_late: args.allow_late || config.pipeline.allow_late_default,
    };
    info!(
        input = %request.input.display(),
        knowledge_time = %request.knowledge_time,
        allow_late = request.allow_late,
        "load starting"
    );

    let report = run_pipeline(&engine, request)
        .await
        .map_err(|e| anyhow::anyhow!("[{}] {e}", e.error_code()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn query(config: &RefdataConfig, args: QueryArgs) -> anyhow::Result<()> {
    let engine = BitemporalEngine::open(config).context("opening timeline store")?;
    let mut query = AsOfQuery::at(args.knowledge_time);
    if let Some(valid_time) = args.valid_time {
        query = query.valid_at(valid_time);
    }
    if !args.security_ids.is_empty() {
        query = query.for_keys(args.security_ids);
    }

    let rows = engine
        .query_as_of(&query)
        .await
        .map_err(|e| anyhow::anyhow!("[{}] {e}", e.error_code()))?;
    if rows.is_empty() {
        println!("{EMPTY_SNAPSHOT}");
    } else {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }
    Ok(())
}
