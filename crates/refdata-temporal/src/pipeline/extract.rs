//! Reads raw records from a JSON array or a JSON Lines file.

use std::path::PathBuf;

use serde_json::Value;

use refdata_core::errors::RefdataResult;

use super::Stage;

/// A record as read from the input, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    /// Zero-based line number in JSON Lines mode, element position in array mode.
    pub index: usize,
    /// Parsed JSON, or the parse error for this record.
    pub payload: Result<Value, String>,
}

pub struct ExtractStage;

impl ExtractStage {
    /// Split `raw` into records. A document whose first non-blank character
    /// is `[` is parsed as one array; anything else is read as JSON Lines
    /// with blank lines skipped. A bad line only spoils its own record.
    pub fn parse(raw: &str) -> RefdataResult<Vec<ExtractedRecord>> {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('[') {
            let values: Vec<Value> = serde_json::from_str(trimmed)?;
            return Ok(values
                .into_iter()
                .enumerate()
                .map(|(index, value)| ExtractedRecord {
                    index,
                    payload: Ok(value),
                })
                .collect());
        }

        Ok(raw
            .lines()
            .enumerate()
            .map(|(index, line)| (index, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .map(|(index, line)| ExtractedRecord {
                index,
                payload: serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}")),
            })
            .collect())
    }
}

impl Stage for ExtractStage {
    type Input = PathBuf;
    type Output = Vec<ExtractedRecord>;

    fn name(&self) -> &'static str {
        "extract"
    }

    async fn run(&self, input: PathBuf) -> RefdataResult<Vec<ExtractedRecord>> {
        let raw = tokio::fs::read_to_string(&input).await?;
        Self::parse(&raw)
    }
}
