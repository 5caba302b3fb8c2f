//! Pipeline / merge configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Key of the watermark row in `pipeline_watermarks`.
    pub watermark_name: String,
    /// Late-arrival override applied when the caller does not pass one.
    pub allow_late_default: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            watermark_name: "event_time".to_string(),
            allow_late_default: false,
        }
    }
}
