//! BitemporalEngine: the async façade over the merge engine and the
//! timeline store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use refdata_core::config::{PipelineConfig, RefdataConfig};
use refdata_core::errors::RefdataResult;
use refdata_core::models::{AsOfQuery, Fact, MergeOutcome, MergeSummary, TimelineRow};
use refdata_core::time::truncate_to_micros;
use refdata_core::traits::IBitemporalEngine;
use refdata_storage::pool::{ReadPool, WriteConnection};
use refdata_storage::queries::watermark_ops;
use refdata_storage::transaction::with_immediate_transaction;
use refdata_storage::StorageEngine;

use crate::merge;
use crate::query;

/// Merges go through the single write connection; queries and watermark
/// reads go through the read pool and see only committed state.
pub struct BitemporalEngine {
    writer: Arc<WriteConnection>,
    readers: Arc<ReadPool>,
    config: PipelineConfig,
}

impl BitemporalEngine {
    pub fn new(writer: Arc<WriteConnection>, readers: Arc<ReadPool>, config: PipelineConfig) -> Self {
        Self {
            writer,
            readers,
            config,
        }
    }

    pub fn from_storage(storage: &StorageEngine, config: PipelineConfig) -> Self {
        Self::new(storage.writer(), storage.readers(), config)
    }

    /// Open the store described by `config` and build an engine on it.
    pub fn open(config: &RefdataConfig) -> RefdataResult<Self> {
        let storage = StorageEngine::open(&config.storage)?;
        info!(
            path = %storage.path().display(),
            watermark = %config.pipeline.watermark_name,
            "bitemporal engine ready"
        );
        Ok(Self::from_storage(&storage, config.pipeline.clone()))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl IBitemporalEngine for BitemporalEngine {
    async fn merge(
        &self,
        fact: Fact,
        knowledge_time: DateTime<Utc>,
        allow_late: bool,
    ) -> RefdataResult<MergeOutcome> {
        let name = &self.config.watermark_name;
        self.writer
            .with_conn(|conn| merge::merge_fact(conn, &fact, knowledge_time, allow_late, name))
            .await
    }

    async fn merge_batch(
        &self,
        facts: Vec<Fact>,
        knowledge_time: DateTime<Utc>,
        allow_late: bool,
    ) -> RefdataResult<MergeSummary> {
        let name = &self.config.watermark_name;
        self.writer
            .with_conn(|conn| merge::merge_batch(conn, facts, knowledge_time, allow_late, name))
            .await
    }

    async fn query_as_of(&self, query: &AsOfQuery) -> RefdataResult<Vec<TimelineRow>> {
        self.readers.with_conn(|conn| query::execute_as_of(conn, query))
    }

    async fn watermark(&self) -> RefdataResult<Option<DateTime<Utc>>> {
        let name = &self.config.watermark_name;
        self.readers
            .with_conn(|conn| watermark_ops::get_watermark(conn, name))
    }

    async fn override_watermark(&self, value: DateTime<Utc>) -> RefdataResult<()> {
        let name = &self.config.watermark_name;
        let value = truncate_to_micros(value);
        self.writer
            .with_conn(|conn| {
                with_immediate_transaction(conn, |conn| {
                    let previous = watermark_ops::get_watermark(conn, name)?;
                    watermark_ops::override_watermark(conn, name, value)?;
                    warn!(
                        watermark = %name,
                        previous = ?previous,
                        %value,
                        "watermark overridden"
                    );
                    Ok(())
                })
            })
            .await
    }
}
