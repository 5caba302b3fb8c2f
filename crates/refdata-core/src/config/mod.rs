pub mod observability_config;
pub mod pipeline_config;
pub mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{RefdataError, RefdataResult};

pub use observability_config::ObservabilityConfig;
pub use pipeline_config::PipelineConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RefdataConfig {
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

impl RefdataConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load config from a TOML file.
    pub fn from_file(path: &Path) -> RefdataResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)
            .map_err(|e| RefdataError::ConfigError(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RefdataResult<()> {
        if self.storage.read_pool_size == 0 {
            return Err(RefdataError::ConfigError(
                "storage.read_pool_size must be at least 1".to_string(),
            ));
        }
        if self.pipeline.watermark_name.trim().is_empty() {
            return Err(RefdataError::ConfigError(
                "pipeline.watermark_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
