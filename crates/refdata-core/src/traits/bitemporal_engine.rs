//! IBitemporalEngine: the merge + as-of contract the pipeline driver and
//! CLI are written against.

use chrono::{DateTime, Utc};

use crate::errors::RefdataResult;
use crate::models::{AsOfQuery, Fact, MergeOutcome, MergeSummary, TimelineRow};

/// Bi-temporal reference data engine.
///
/// Implementations must apply each `merge` as one atomic transaction and
/// must never let a query observe a partially applied merge.
#[allow(async_fn_in_trait)]
pub trait IBitemporalEngine: Send + Sync {
    /// Integrate one fact at `knowledge_time`.
    async fn merge(
        &self,
        fact: Fact,
        knowledge_time: DateTime<Utc>,
        allow_late: bool,
    ) -> RefdataResult<MergeOutcome>;

    /// Merge a load event's facts, all stamped with one `knowledge_time`.
    async fn merge_batch(
        &self,
        facts: Vec<Fact>,
        knowledge_time: DateTime<Utc>,
        allow_late: bool,
    ) -> RefdataResult<MergeSummary>;

    /// Rows visible at the query's knowledge (and optional valid) instant.
    async fn query_as_of(&self, query: &AsOfQuery) -> RefdataResult<Vec<TimelineRow>>;

    /// Last accepted event time, if any fact has been merged.
    async fn watermark(&self) -> RefdataResult<Option<DateTime<Utc>>>;

    /// Administrative override; the only path that may move the watermark backwards.
    async fn override_watermark(&self, value: DateTime<Utc>) -> RefdataResult<()>;
}
