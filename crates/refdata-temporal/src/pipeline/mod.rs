//! Extract → transform → load.
//!
//! Each stage is a [`Stage`]; `run_pipeline` wires the three together for
//! one load event. The merge semantics live entirely in the engine the load
//! stage is handed.

pub mod extract;
pub mod load;
pub mod transform;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use refdata_core::errors::RefdataResult;
use refdata_core::models::{MergeSummary, RejectedRecord};
use refdata_core::traits::IBitemporalEngine;

pub use extract::{ExtractStage, ExtractedRecord};
pub use load::LoadStage;
pub use transform::{TransformOutput, TransformStage};

/// One step of the pipeline.
#[allow(async_fn_in_trait)]
pub trait Stage {
    type Input;
    type Output;

    fn name(&self) -> &'static str;

    async fn run(&self, input: Self::Input) -> RefdataResult<Self::Output>;
}

/// Parameters of one load event.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub input: PathBuf,
    /// Knowledge time stamped on every row this load writes.
    pub knowledge_time: DateTime<Utc>,
    pub allow_late: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub summary: MergeSummary,
    pub rejected: Vec<RejectedRecord>,
}

/// Run extract, transform and load for `request` against `engine`.
pub async fn run_pipeline<E: IBitemporalEngine>(
    engine: &E,
    request: PipelineRequest,
) -> RefdataResult<PipelineReport> {
    let extracted = ExtractStage.run(request.input.clone()).await?;
    info!(
        stage = ExtractStage.name(),
        input = %request.input.display(),
        records = extracted.len(),
        "stage complete"
    );

    let transformed = TransformStage.run(extracted).await?;
    let rejected = transformed.rejected.clone();
    info!(
        stage = TransformStage.name(),
        facts = transformed.facts.len(),
        rejected = rejected.len(),
        "stage complete"
    );

    let load = LoadStage::new(engine, request.knowledge_time, request.allow_late);
    let summary = load.run(transformed).await?;
    info!(
        stage = load.name(),
        run_id = %summary.run_id,
        processed = summary.processed,
        "stage complete"
    );

    Ok(PipelineReport { summary, rejected })
}
