//! Result types of a single merge and of a batch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the merge cases a fact resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeCase {
    /// First row ever for the key.
    Insert,
    /// Same valid_from, different payload: knowledge advances, valid time untouched.
    Correction,
    /// Event after every current interval: the open-ended row is bounded at the event.
    Append,
    /// Event strictly inside a bounded interval: the interval is split in two.
    Split,
    /// Event before the first interval or inside a gap: filled up to the next interval.
    GapFill,
    /// Identical payload at an existing valid_from; nothing written.
    NoOp,
}

impl MergeCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Correction => "correction",
            Self::Append => "append",
            Self::Split => "split",
            Self::GapFill => "gap_fill",
            Self::NoOp => "no_op",
        }
    }
}

/// What one committed merge did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub security_id: String,
    pub case: MergeCase,
    /// Rows whose `knowledge_to` was closed at the merge's knowledge time.
    pub closed_row_ids: Vec<i64>,
    /// Rows inserted by the merge.
    pub inserted_row_ids: Vec<i64>,
    /// Watermark after the merge committed.
    pub watermark: DateTime<Utc>,
}

impl MergeOutcome {
    pub fn is_noop(&self) -> bool {
        self.case == MergeCase::NoOp
    }
}

/// A raw record the transform stage could not turn into a fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position in the extracted input.
    pub index: usize,
    pub reason: String,
}

/// Aggregate statistics for one load event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub run_id: String,
    pub knowledge_time: DateTime<Utc>,
    /// Facts that were merged (including no-ops).
    pub processed: usize,
    /// Facts rejected by the watermark gate.
    pub skipped_as_late: usize,
    /// Records rejected before any transaction started.
    pub skipped_malformed: usize,
    pub inserted_rows: usize,
    pub closed_rows: usize,
    pub cases: BTreeMap<MergeCase, usize>,
    /// Latest event time among merged facts.
    pub max_event_time: Option<DateTime<Utc>>,
    /// Watermark after the batch.
    pub watermark: Option<DateTime<Utc>>,
}

impl MergeSummary {
    pub fn new(run_id: impl Into<String>, knowledge_time: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            knowledge_time,
            processed: 0,
            skipped_as_late: 0,
            skipped_malformed: 0,
            inserted_rows: 0,
            closed_rows: 0,
            cases: BTreeMap::new(),
            max_event_time: None,
            watermark: None,
        }
    }

    /// Fold one committed merge into the totals.
    pub fn record(&mut self, outcome: &MergeOutcome, event_time: DateTime<Utc>) {
        self.processed += 1;
        self.inserted_rows += outcome.inserted_row_ids.len();
        self.closed_rows += outcome.closed_row_ids.len();
        *self.cases.entry(outcome.case).or_insert(0) += 1;
        if self.max_event_time.map_or(true, |max| event_time > max) {
            self.max_event_time = Some(event_time);
        }
        self.watermark = Some(outcome.watermark);
    }

    pub fn count(&self, case: MergeCase) -> usize {
        self.cases.get(&case).copied().unwrap_or(0)
    }
}
