//! Hands normalised facts to the engine under one knowledge time.

use chrono::{DateTime, Utc};

use refdata_core::errors::RefdataResult;
use refdata_core::models::MergeSummary;
use refdata_core::traits::IBitemporalEngine;

use super::transform::TransformOutput;
use super::Stage;

pub struct LoadStage<'a, E> {
    engine: &'a E,
    knowledge_time: DateTime<Utc>,
    allow_late: bool,
}

impl<'a, E: IBitemporalEngine> LoadStage<'a, E> {
    pub fn new(engine: &'a E, knowledge_time: DateTime<Utc>, allow_late: bool) -> Self {
        Self {
            engine,
            knowledge_time,
            allow_late,
        }
    }
}

impl<E: IBitemporalEngine> Stage for LoadStage<'_, E> {
    type Input = TransformOutput;
    type Output = MergeSummary;

    fn name(&self) -> &'static str {
        "load"
    }

    async fn run(&self, input: TransformOutput) -> RefdataResult<MergeSummary> {
        let mut summary = self
            .engine
            .merge_batch(input.facts, self.knowledge_time, self.allow_late)
            .await?;
        summary.skipped_malformed = input.rejected.len();
        Ok(summary)
    }
}
