//! Normalises raw records into facts.

use serde_json::Value;
use tracing::warn;

use refdata_core::errors::RefdataResult;
use refdata_core::models::{Fact, RejectedRecord};

use super::extract::ExtractedRecord;
use super::Stage;

#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub facts: Vec<Fact>,
    pub rejected: Vec<RejectedRecord>,
}

pub struct TransformStage;

impl TransformStage {
    fn normalise(record: &ExtractedRecord) -> Result<Fact, String> {
        match &record.payload {
            Err(reason) => Err(reason.clone()),
            Ok(Value::Object(map)) => Fact::from_record(map).map_err(|e| e.to_string()),
            Ok(_) => Err("record is not a JSON object".to_string()),
        }
    }
}

impl Stage for TransformStage {
    type Input = Vec<ExtractedRecord>;
    type Output = TransformOutput;

    fn name(&self) -> &'static str {
        "transform"
    }

    async fn run(&self, input: Vec<ExtractedRecord>) -> RefdataResult<TransformOutput> {
        let mut output = TransformOutput::default();
        for record in &input {
            match Self::normalise(record) {
                Ok(fact) => output.facts.push(fact),
                Err(reason) => {
                    warn!(index = record.index, %reason, "malformed record skipped");
                    output.rejected.push(RejectedRecord {
                        index: record.index,
                        reason,
                    });
                }
            }
        }
        Ok(output)
    }
}
